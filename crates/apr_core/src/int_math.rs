/// Divides by `2^power`, rounding up.
#[inline]
pub fn ceil_div_pow2(x: usize, power: u32) -> usize {
    let divisor = 1usize << power;
    (x + divisor - 1) >> power
}

/// The smallest `p` such that `2^p >= x`. Zero for `x <= 1`.
#[inline]
pub fn ceil_log2(x: usize) -> u32 {
    if x <= 1 {
        0
    } else {
        usize::BITS - (x - 1).leading_zeros()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ceil_div() {
        assert_eq!(ceil_div_pow2(0, 1), 0);
        assert_eq!(ceil_div_pow2(1, 1), 1);
        assert_eq!(ceil_div_pow2(2, 1), 1);
        assert_eq!(ceil_div_pow2(3, 1), 2);
        assert_eq!(ceil_div_pow2(4, 1), 2);

        assert_eq!(ceil_div_pow2(1, 2), 1);
        assert_eq!(ceil_div_pow2(4, 2), 1);
        assert_eq!(ceil_div_pow2(5, 2), 2);
        assert_eq!(ceil_div_pow2(100, 0), 100);
    }

    #[test]
    fn log2_rounds_up() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(4), 2);
        assert_eq!(ceil_log2(5), 3);
        assert_eq!(ceil_log2(4096), 12);
        assert_eq!(ceil_log2(4097), 13);
    }
}
