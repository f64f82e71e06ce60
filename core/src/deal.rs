use crate::error::DealError;

pub const DEAL_SEED: u32 = 0x5EED_D3A1;

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

/// Uniform in `[0, 1)` from 24 mixed bits.
pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ salt);
    (mixed >> 8) as f32 / ((1u32 << 24) as f32)
}

pub fn level_seed(base: u32, level: u32, rows: usize, cols: usize) -> u32 {
    let grid = ((cols as u32) << 16) ^ (rows as u32);
    base ^ level.wrapping_mul(0x9E37_79B9) ^ grid ^ 0x5CA7_7EED
}

/// `perm[cell]` is the home index dealt onto that cell. Never returns the
/// identity for more than one cell.
pub fn deal_permutation(seed: u32, total: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..total).collect();
    for i in (1..order.len()).rev() {
        let salt = 0xC0DE_u32.wrapping_add(i as u32);
        let j = ((rand_unit(seed, salt) * (i as f32 + 1.0)) as usize).min(i);
        order.swap(i, j);
    }
    if total > 1 && order.iter().enumerate().all(|(cell, home)| cell == *home) {
        order.rotate_left(1);
    }
    order
}

pub fn validate_permutation(rows: usize, cols: usize, perm: &[usize]) -> Result<(), DealError> {
    let expected = rows * cols;
    if perm.len() != expected {
        return Err(DealError::Length {
            expected,
            found: perm.len(),
        });
    }
    let mut seen = vec![false; expected];
    for (index, home) in perm.iter().enumerate() {
        let Some(slot) = seen.get_mut(*home) else {
            return Err(DealError::OutOfRange { home: *home, index });
        };
        if *slot {
            return Err(DealError::Duplicate { home: *home });
        }
        *slot = true;
    }
    Ok(())
}
