use seqcov_core::models::{SumStat, Track};

///
/// Clip per-base values in place. Soft clipping compresses values above `s`
/// to `s + sqrt(x - s)`; the hard clip then truncates to `clip`.
///
pub fn clip_bases(values: &mut [f32], clip_soft: Option<f32>, clip: Option<f32>) {
    for value in values.iter_mut() {
        if let Some(soft) = clip_soft {
            if *value > soft {
                *value = soft + (*value - soft).sqrt();
            }
        }
        if let Some(hard) = clip {
            *value = value.min(hard);
        }
    }
}

/// Summarise the values of one bin.
pub fn summarize(bin: &[f32], sum_stat: SumStat) -> f32 {
    if bin.is_empty() {
        return 0.0;
    }

    match sum_stat {
        SumStat::Sum => bin.iter().sum(),
        SumStat::Mean => bin.iter().sum::<f32>() / bin.len() as f32,
        SumStat::Max => bin.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        SumStat::Min => bin.iter().copied().fold(f32::INFINITY, f32::min),
        SumStat::Median => {
            let mut sorted = bin.to_vec();
            sorted.sort_by(f32::total_cmp);
            let mid = sorted.len() / 2;
            match sorted.len() % 2 {
                0 => (sorted[mid - 1] + sorted[mid]) / 2.0,
                _ => sorted[mid],
            }
        }
        SumStat::SumSqrt => (1.0 + bin.iter().sum::<f32>()).sqrt() - 1.0,
    }
}

///
/// Pool per-base values into consecutive bins of `pool_width` bases.
///
/// # Arguments
/// - values: per-base values, a multiple of `pool_width` long
/// - pool_width: bases per bin
/// - sum_stat: statistic applied to each bin
/// - scale: multiplier applied to every pooled value
///
pub fn pool_bins(values: &[f32], pool_width: usize, sum_stat: SumStat, scale: f32) -> Vec<f32> {
    values
        .chunks(pool_width)
        .map(|bin| summarize(bin, sum_stat) * scale)
        .collect()
}

///
/// Turn the raw per-base coverage of one window into the pooled signal of a
/// track: clip every base, then pool.
///
pub fn pool_window(track: &Track, values: &mut [f32], pool_width: usize) -> Vec<f32> {
    clip_bases(values, track.clip_soft, track.clip);
    pool_bins(values, pool_width, track.sum_stat, track.scale)
}
