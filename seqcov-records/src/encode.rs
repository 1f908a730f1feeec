use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EncodingError;

/// Index code of `N`, the unknown base.
pub const N_CODE: u8 = 4;

///
/// How nucleotides are stored in a record.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Four bytes per base (A, C, G, T columns), `N` is an all-zero row.
    #[default]
    OneHot,
    /// One byte per base: A=0, C=1, G=2, T=3, N=4.
    Index,
}

impl Encoding {
    /// Bytes per base.
    pub fn depth(&self) -> usize {
        match self {
            Encoding::OneHot => 4,
            Encoding::Index => 1,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Encoding::OneHot => 0,
            Encoding::Index => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Encoding::OneHot),
            1 => Some(Encoding::Index),
            _ => None,
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "one_hot" | "onehot" => Ok(Encoding::OneHot),
            "index" => Ok(Encoding::Index),
            _ => Err(format!("Unknown encoding: {} (expected one_hot or index)", s)),
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::OneHot => write!(f, "one_hot"),
            Encoding::Index => write!(f, "index"),
        }
    }
}

/// Index code of a nucleotide, case-insensitive. `None` outside {A,C,G,T,N}.
pub fn nucleotide_code(base: u8) -> Option<u8> {
    match base.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        b'N' => Some(N_CODE),
        _ => None,
    }
}

///
/// Encode a nucleotide sequence.
///
/// Symbols outside {A,C,G,T,N} become `N`, or fail when `strict` is set.
///
/// # Arguments
/// - sequence: ASCII nucleotides
/// - encoding: output layout
/// - strict: reject unknown symbols instead of mapping them to `N`
///
pub fn encode_sequence(
    sequence: &[u8],
    encoding: Encoding,
    strict: bool,
) -> Result<Vec<u8>, EncodingError> {
    let mut encoded = vec![0u8; sequence.len() * encoding.depth()];

    for (position, &base) in sequence.iter().enumerate() {
        let code = match nucleotide_code(base) {
            Some(code) => code,
            None if strict => {
                return Err(EncodingError::InvalidSymbol {
                    symbol: base as char,
                    position,
                });
            }
            None => N_CODE,
        };

        match encoding {
            Encoding::Index => encoded[position] = code,
            Encoding::OneHot => {
                if code != N_CODE {
                    encoded[position * 4 + code as usize] = 1;
                }
            }
        }
    }

    Ok(encoded)
}

///
/// Decode an encoded sequence back to upper-case ASCII.
///
pub fn decode_sequence(encoded: &[u8], encoding: Encoding) -> Result<Vec<u8>, EncodingError> {
    const BASES: &[u8; 5] = b"ACGTN";

    match encoding {
        Encoding::Index => encoded
            .iter()
            .enumerate()
            .map(|(position, &code)| {
                BASES
                    .get(code as usize)
                    .copied()
                    .ok_or(EncodingError::InvalidCode { position })
            })
            .collect(),
        Encoding::OneHot => {
            if encoded.len() % 4 != 0 {
                return Err(EncodingError::InvalidLength {
                    length: encoded.len(),
                    depth: 4,
                });
            }
            encoded
                .chunks(4)
                .enumerate()
                .map(|(position, row)| {
                    let hot: Vec<usize> = (0..4).filter(|&i| row[i] != 0).collect();
                    match hot.as_slice() {
                        [] => Ok(b'N'),
                        [i] if row[*i] == 1 => Ok(BASES[*i]),
                        _ => Err(EncodingError::InvalidCode { position }),
                    }
                })
                .collect()
        }
    }
}
