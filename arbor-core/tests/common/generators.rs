//! Stochastic document generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use arbor_core::{Map, Value};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("ARBOR_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    /// Returns 0, 1, 2, ... with decreasing probability
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Poisson-like count (simplified)
    pub fn poisson(&mut self, lambda: f64) -> usize {
        let l = (-lambda).exp();
        let mut k = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.rng.gen::<f64>();
            if p <= l {
                break;
            }
        }
        k - 1
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Run of insignificant whitespace, usually short
    pub fn whitespace(&mut self) -> String {
        let chars = [' ', ' ', ' ', '\n', '\t', '\r'];
        (0..self.geometric(0.6))
            .map(|_| chars[self.rng.gen_range(0..chars.len())])
            .collect()
    }

    /// Random object key (lowercase ASCII, never empty)
    pub fn key(&mut self) -> String {
        let len = 1 + self.geometric(0.7);
        (0..len).map(|_| self.rng.gen_range(b'a'..=b'z') as char).collect()
    }

    /// Random string literal with its decoded contents
    pub fn string(&mut self) -> (String, String) {
        // (source text, decoded text)
        const PIECES: &[(&str, &str)] = &[
            ("a", "a"),
            ("Z", "Z"),
            ("7", "7"),
            (" ", " "),
            ("é", "é"),
            ("日本", "日本"),
            ("\\n", "\n"),
            ("\\t", "\t"),
            ("\\\"", "\""),
            ("\\\\", "\\"),
            ("\\/", "/"),
            ("\\b", "\u{8}"),
            ("\\u00e9", "é"),
            ("\\u0000", "\0"),
            ("\\uD83D\\uDE00", "😀"),
        ];
        let mut text = String::from("\"");
        let mut decoded = String::new();
        for _ in 0..self.geometric(0.8) {
            let (src, out) = PIECES[self.rng.gen_range(0..PIECES.len())];
            text.push_str(src);
            decoded.push_str(out);
        }
        text.push('"');
        (text, decoded)
    }

    /// Random numeric literal following the number grammar
    pub fn number(&mut self) -> (String, f64) {
        let mut text = String::new();
        if self.chance(0.3) {
            text.push('-');
        }
        if self.chance(0.2) {
            text.push('0');
        } else {
            text.push(self.rng.gen_range(b'1'..=b'9') as char);
            for _ in 0..self.geometric(0.6) {
                text.push(self.rng.gen_range(b'0'..=b'9') as char);
            }
        }
        if self.chance(0.3) {
            text.push('.');
            for _ in 0..1 + self.geometric(0.5) {
                text.push(self.rng.gen_range(b'0'..=b'9') as char);
            }
        }
        if self.chance(0.2) {
            text.push(if self.chance(0.5) { 'e' } else { 'E' });
            match self.rng.gen_range(0..3) {
                0 => text.push('+'),
                1 => text.push('-'),
                _ => {}
            }
            text.push_str(&self.rng.gen_range(0..30).to_string());
        }
        let value = text.parse().unwrap_or_else(|e| panic!("generated bad number {:?}: {}", text, e));
        (text, value)
    }

    /// Random document up to `depth` levels of nesting, with its expected tree
    pub fn document(&mut self, depth: usize) -> (String, Value) {
        let pick = if depth == 0 {
            self.rng.gen_range(0..5)
        } else {
            self.rng.gen_range(0..7)
        };
        match pick {
            0 => ("null".to_string(), Value::Null),
            1 => {
                let b = self.chance(0.5);
                (b.to_string(), Value::Boolean(b))
            }
            2 | 3 => {
                let (text, n) = self.number();
                (text, Value::Number(n))
            }
            4 => {
                let (text, s) = self.string();
                (text, Value::String(s))
            }
            5 => {
                let mut text = String::from("[");
                let mut items = Vec::new();
                for i in 0..self.geometric(0.6) {
                    if i > 0 {
                        text.push(',');
                    }
                    text.push_str(&self.whitespace());
                    let (item_text, item) = self.document(depth - 1);
                    text.push_str(&item_text);
                    text.push_str(&self.whitespace());
                    items.push(item);
                }
                text.push(']');
                (text, Value::List(items))
            }
            _ => {
                let mut text = String::from("{");
                let mut map = Map::new();
                for i in 0..self.geometric(0.6) {
                    if i > 0 {
                        text.push(',');
                    }
                    let key = self.key();
                    text.push_str(&self.whitespace());
                    text.push_str(&format!("\"{}\"", key));
                    text.push_str(&self.whitespace());
                    text.push(':');
                    text.push_str(&self.whitespace());
                    let (item_text, item) = self.document(depth - 1);
                    text.push_str(&item_text);
                    map.insert(key, item);
                }
                text.push('}');
                (text, Value::Object(map))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut g1 = Gen::new(42);
        let mut g2 = Gen::new(42);

        for _ in 0..10 {
            assert_eq!(g1.document(3).0, g2.document(3).0);
            assert_eq!(g1.geometric(0.9), g2.geometric(0.9));
        }
    }

    #[test]
    fn test_geometric_distribution() {
        let mut gen = Gen::new(12345);
        let samples: Vec<usize> = (0..1000).map(|_| gen.geometric(0.9)).collect();

        // With α=0.9, we expect mean ≈ 9 (geometric mean = α/(1-α))
        let mean: f64 = samples.iter().sum::<usize>() as f64 / samples.len() as f64;
        assert!(mean > 5.0 && mean < 15.0, "Mean {} out of expected range", mean);
    }
}
