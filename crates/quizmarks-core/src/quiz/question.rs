//! Difficulty levels and arithmetic question generation.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Named magnitude of generated operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Advanced];

    /// Digit range used when the configuration does not override it.
    pub fn default_range(self) -> DigitRange {
        match self {
            Difficulty::Easy => DigitRange::new(1, 1),
            Difficulty::Moderate => DigitRange::new(2, 2),
            Difficulty::Advanced => DigitRange::new(4, 4),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Moderate => write!(f, "moderate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "moderate" => Ok(Difficulty::Moderate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!(
                "unknown difficulty: {other} (expected easy, moderate or advanced)"
            )),
        }
    }
}

/// Inclusive range of operand digit counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitRange {
    pub min_digits: u32,
    pub max_digits: u32,
}

/// Operands are `i64`; eighteen digits is the widest range whose sum still fits.
pub const MAX_DIGITS: u32 = 18;

impl DigitRange {
    pub const fn new(min_digits: u32, max_digits: u32) -> Self {
        Self {
            min_digits,
            max_digits,
        }
    }

    /// Smallest and largest operand value. A one-digit lower bound starts at
    /// 1 so zero never appears as an operand.
    pub fn bounds(&self) -> (i64, i64) {
        let min = if self.min_digits <= 1 {
            1
        } else {
            10i64.pow(self.min_digits - 1)
        };
        let max = 10i64.pow(self.max_digits) - 1;
        (min, max)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_digits == 0 {
            return Err("min_digits must be at least 1".into());
        }
        if self.max_digits > MAX_DIGITS {
            return Err(format!("max_digits must be at most {MAX_DIGITS}"));
        }
        if self.min_digits > self.max_digits {
            return Err(format!(
                "min_digits ({}) exceeds max_digits ({})",
                self.min_digits, self.max_digits
            ));
        }
        Ok(())
    }

    /// Draw a value uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let (min, max) = self.bounds();
        rng.gen_range(min..=max)
    }
}

/// Number of decimal digits in `n`, ignoring sign.
pub fn digit_count(n: i64) -> u32 {
    let mut n = n.unsigned_abs();
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Sub,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
        }
    }

    pub fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
        }
    }
}

/// One arithmetic problem with its expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub a: i64,
    pub b: i64,
    pub operator: Operator,
    pub answer: i64,
}

impl Question {
    pub fn new(a: i64, b: i64, operator: Operator) -> Self {
        Self {
            a,
            b,
            operator,
            answer: operator.apply(a, b),
        }
    }

    /// Generate a random problem. With `non_negative` set, subtraction
    /// operands are swapped so the answer never drops below zero.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, range: DigitRange, non_negative: bool) -> Self {
        let mut a = range.sample(rng);
        let mut b = range.sample(rng);
        let operator = if rng.gen_bool(0.5) {
            Operator::Add
        } else {
            Operator::Sub
        };
        if non_negative && operator == Operator::Sub && a < b {
            std::mem::swap(&mut a, &mut b);
        }
        Self::new(a, b, operator)
    }

    /// Nudge shown after a first wrong answer.
    pub fn hint(&self) -> String {
        match self.operator {
            Operator::Add => format!(
                "Try starting from {} and counting up.",
                self.a.max(self.b)
            ),
            Operator::Sub if self.answer >= 0 => format!(
                "To find {} - {}, try counting up from {} to {}.",
                self.a, self.b, self.b, self.a
            ),
            Operator::Sub => format!(
                "When {} is larger than {}, the answer will be negative.",
                self.b, self.a
            ),
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} =", self.a, self.operator.symbol(), self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_ranges_match_difficulty() {
        assert_eq!(Difficulty::Easy.default_range().bounds(), (1, 9));
        assert_eq!(Difficulty::Moderate.default_range().bounds(), (10, 99));
        assert_eq!(Difficulty::Advanced.default_range().bounds(), (1000, 9999));
    }

    #[test]
    fn generated_operands_have_configured_digit_count() {
        let mut rng = StdRng::seed_from_u64(42);
        for difficulty in Difficulty::ALL {
            let range = difficulty.default_range();
            for _ in 0..500 {
                let q = Question::generate(&mut rng, range, false);
                for operand in [q.a, q.b] {
                    let digits = digit_count(operand);
                    assert!(
                        (range.min_digits..=range.max_digits).contains(&digits),
                        "{difficulty}: operand {operand} has {digits} digits"
                    );
                }
                assert_eq!(q.answer, q.operator.apply(q.a, q.b));
            }
        }
    }

    #[test]
    fn non_negative_subtraction_swaps_operands() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut saw_subtraction = false;
        for _ in 0..500 {
            let q = Question::generate(&mut rng, DigitRange::new(1, 2), true);
            if q.operator == Operator::Sub {
                saw_subtraction = true;
                assert!(q.a >= q.b, "{q} went negative");
                assert!(q.answer >= 0);
            }
        }
        assert!(saw_subtraction);
    }

    #[test]
    fn both_operators_are_drawn() {
        let mut rng = StdRng::seed_from_u64(11);
        let ops: Vec<Operator> = (0..100)
            .map(|_| Question::generate(&mut rng, DigitRange::new(1, 1), false).operator)
            .collect();
        assert!(ops.contains(&Operator::Add));
        assert!(ops.contains(&Operator::Sub));
    }

    #[test]
    fn hints_follow_operator_and_sign() {
        assert_eq!(
            Question::new(3, 8, Operator::Add).hint(),
            "Try starting from 8 and counting up."
        );
        assert_eq!(
            Question::new(9, 4, Operator::Sub).hint(),
            "To find 9 - 4, try counting up from 4 to 9."
        );
        assert_eq!(
            Question::new(2, 7, Operator::Sub).hint(),
            "When 7 is larger than 2, the answer will be negative."
        );
    }

    #[test]
    fn display_reads_like_a_prompt() {
        assert_eq!(Question::new(12, 5, Operator::Sub).to_string(), "12 - 5 =");
    }

    #[test]
    fn parse_difficulty() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" advanced ".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!("hard".parse::<Difficulty>().is_err());
    }

    #[test]
    fn digit_range_validation() {
        assert!(DigitRange::new(1, 1).validate().is_ok());
        assert!(DigitRange::new(0, 2).validate().is_err());
        assert!(DigitRange::new(3, 2).validate().is_err());
        assert!(DigitRange::new(1, 19).validate().is_err());
    }
}
