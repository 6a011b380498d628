//! Keystroke simulation producing input-field snapshots

use rand::Rng;

/// Turns a target phrase into the sequence of input-field snapshots a typist would send
///
/// One snapshot is produced per character. With probability `typo_rate` a
/// wrong character is typed first and then corrected, which sends an extra
/// invalid snapshot the server counts as a miss.
pub struct InputPlanner {
    typo_rate: f64,
}

impl InputPlanner {
    pub fn new(typo_rate: f64) -> Self {
        Self {
            typo_rate: typo_rate.clamp(0.0, 1.0),
        }
    }

    pub fn plan<R: Rng>(&self, phrase: &str, rng: &mut R) -> Vec<String> {
        let mut snapshots = Vec::with_capacity(phrase.len());
        let mut typed = String::with_capacity(phrase.len());

        for expected in phrase.chars() {
            if self.typo_rate > 0.0 && rng.gen_bool(self.typo_rate) {
                let mut wrong = typed.clone();
                wrong.push(wrong_char(expected));
                snapshots.push(wrong);
            }
            typed.push(expected);
            snapshots.push(typed.clone());
        }

        snapshots
    }
}

impl Default for InputPlanner {
    fn default() -> Self {
        Self::new(0.0)
    }
}

fn wrong_char(expected: char) -> char {
    if expected == '#' {
        '~'
    } else {
        '#'
    }
}
