use std::collections::BTreeSet;

use crate::encode::{Encoding, N_CODE};
use crate::shard::ShardRecord;

/// Fill value of padded positions in a shifted one-hot sequence.
pub const SHIFT_PAD_VALUE: f32 = 0.25;

///
/// Reverse complement an encoded sequence in place.
///
/// One-hot rows are ordered A, C, G, T, so reversing the whole buffer both
/// reverses the positions and complements every base.
///
pub fn reverse_complement(sequence: &mut [u8], encoding: Encoding) {
    sequence.reverse();
    if encoding == Encoding::Index {
        for code in sequence.iter_mut() {
            if *code < N_CODE {
                *code = 3 - *code;
            }
        }
    }
}

/// Reverse the position axis of position-major targets, keeping target order.
pub fn flip_targets(targets: &mut [f32], num_targets: usize) {
    if num_targets == 0 {
        return;
    }
    let positions = targets.len() / num_targets;
    for p in 0..positions / 2 {
        let q = positions - 1 - p;
        for t in 0..num_targets {
            targets.swap(p * num_targets + t, q * num_targets + t);
        }
    }
}

///
/// Reverse complement a record: the sequence is reverse complemented and the
/// targets are flipped along the position axis.
///
pub fn reverse_complement_record(record: &mut ShardRecord, encoding: Encoding, num_targets: usize) {
    reverse_complement(&mut record.sequence, encoding);
    flip_targets(&mut record.targets, num_targets);
}

///
/// Shift a one-hot sequence by `shift` positions, right when positive and
/// left when negative. Vacated positions hold [SHIFT_PAD_VALUE] in every
/// column.
///
/// # Returns
/// - the shifted sequence as `len * 4` floats
///
pub fn shift_one_hot(one_hot: &[u8], shift: i32) -> Vec<f32> {
    const DEPTH: usize = 4;
    let length = one_hot.len() / DEPTH;
    let offset = (shift.unsigned_abs() as usize).min(length);

    let mut shifted = vec![SHIFT_PAD_VALUE; length * DEPTH];
    let kept = length - offset;
    let (src, dst) = if shift >= 0 { (0, offset) } else { (offset, 0) };

    for (out, &value) in shifted[dst * DEPTH..(dst + kept) * DEPTH]
        .iter_mut()
        .zip(&one_hot[src * DEPTH..(src + kept) * DEPTH])
    {
        *out = value as f32;
    }

    shifted
}

///
/// Number of distinct variants of one record produced by augmentation: the
/// shift offsets (the identity shift counted once) times two when reverse
/// complements are included.
///
pub fn num_possible_augmentations(reverse_complement: bool, shifts: &[i32]) -> usize {
    let distinct: BTreeSet<i32> = shifts.iter().copied().chain([0]).collect();
    let strands = if reverse_complement { 2 } else { 1 };
    distinct.len() * strands
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use seqcov_core::models::Split;

    use crate::encode::{decode_sequence, encode_sequence};

    #[rstest]
    #[case(Encoding::OneHot)]
    #[case(Encoding::Index)]
    fn test_reverse_complement(#[case] encoding: Encoding) {
        let mut encoded = encode_sequence(b"AACGTN", encoding, false).unwrap();
        reverse_complement(&mut encoded, encoding);
        assert_eq!(decode_sequence(&encoded, encoding).unwrap(), b"NACGTT".to_vec());
    }

    #[rstest]
    #[case(Encoding::OneHot)]
    #[case(Encoding::Index)]
    fn test_reverse_complement_is_an_involution(#[case] encoding: Encoding) {
        let original = encode_sequence(b"GATTACANNC", encoding, false).unwrap();
        let mut encoded = original.clone();
        reverse_complement(&mut encoded, encoding);
        reverse_complement(&mut encoded, encoding);
        assert_eq!(encoded, original);
    }

    #[rstest]
    fn test_reverse_complement_record_flips_targets() {
        let mut record = ShardRecord {
            chrom: "chr1".to_string(),
            start: 0,
            end: 3,
            split: Split::Train,
            sequence: encode_sequence(b"ACG", Encoding::Index, false).unwrap(),
            // 3 positions x 2 targets
            targets: vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0],
        };
        reverse_complement_record(&mut record, Encoding::Index, 2);

        assert_eq!(record.sequence, vec![1, 2, 3]);
        assert_eq!(record.targets, vec![3.0, 30.0, 2.0, 20.0, 1.0, 10.0]);
    }

    #[rstest]
    fn test_shift_right_pads_start() {
        let one_hot = encode_sequence(b"ACG", Encoding::OneHot, false).unwrap();
        let shifted = shift_one_hot(&one_hot, 1);
        assert_eq!(
            shifted,
            vec![
                0.25, 0.25, 0.25, 0.25, //
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0,
            ]
        );
    }

    #[rstest]
    fn test_shift_left_pads_end() {
        let one_hot = encode_sequence(b"ACG", Encoding::OneHot, false).unwrap();
        let shifted = shift_one_hot(&one_hot, -2);
        assert_eq!(&shifted[0..4], &[0.0, 0.0, 1.0, 0.0]);
        assert_eq!(&shifted[4..], &[0.25; 8]);
        assert_eq!(shift_one_hot(&one_hot, 5), vec![0.25; 12]);
    }

    #[rstest]
    #[case(false, &[], 1)]
    #[case(true, &[], 2)]
    #[case(true, &[-1, 1], 6)]
    #[case(false, &[0, 3], 2)]
    fn test_num_possible_augmentations(
        #[case] rc: bool,
        #[case] shifts: &[i32],
        #[case] expected: usize,
    ) {
        assert_eq!(num_possible_augmentations(rc, shifts), expected);
    }
}
