/// Linear congruential generator with the Numerical Recipes constants.
///
/// Not a statistical RNG: it only exists so that shuffles and tie-breaking jitter are identical
/// across runs and platforms.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

const MULTIPLIER: u64 = 1_664_525;
const INCREMENT: u64 = 1_013_904_223;
const MODULUS: u64 = 1 << 32;

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % MODULUS,
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (MULTIPLIER * self.state + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// In-place Fisher–Yates shuffle, walking from the back.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        let mut m = items.len();
        while m > 0 {
            let i = (self.next_f64() * m as f64) as usize;
            m -= 1;
            items.swap(m, i.min(m));
        }
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(1)
    }
}
