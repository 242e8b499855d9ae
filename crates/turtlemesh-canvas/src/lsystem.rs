use tracing::warn;

use crate::config::LSystemConfig;

/// Reference cap on generated word length (10^6 symbols).
pub const DEFAULT_WORD_CAP: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionOutcome {
    pub word: String,
    /// `Some(n)` if expansion was stopped after iteration `n` because
    /// the next rewrite would have exceeded the cap.
    pub truncated_at_iteration: Option<u32>,
}

/// Iteratively rewrite `config.axiom` through `config.iterations`
/// generations using `config.rules`. A symbol with no matching rule
/// passes through unchanged.
pub fn expand(config: &LSystemConfig, cap: usize) -> ExpansionOutcome {
    let mut current = config.axiom.clone();

    for iteration in 0..config.iterations {
        let mut next = String::with_capacity(current.len());
        for ch in current.chars() {
            match config.rules.get(&ch) {
                Some(replacement) => next.push_str(replacement),
                None => next.push(ch),
            }
        }

        if next.len() > cap {
            warn!(
                iteration,
                cap, "L-system word would exceed the size cap, stopping expansion here"
            );
            return ExpansionOutcome {
                word: current,
                truncated_at_iteration: Some(iteration),
            };
        }
        current = next;
    }

    ExpansionOutcome {
        word: current,
        truncated_at_iteration: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(axiom: &str, iterations: u32, rules: &[(char, &str)]) -> LSystemConfig {
        let mut c = LSystemConfig::default();
        c.axiom = axiom.to_string();
        c.iterations = iterations;
        c.rules = rules.iter().map(|&(k, v)| (k, v.to_string())).collect::<HashMap<_, _>>();
        c
    }

    #[test]
    fn zero_iterations_returns_axiom() {
        let c = config_with("F+F", 0, &[('F', "F-F")]);
        assert_eq!(expand(&c, DEFAULT_WORD_CAP).word, "F+F");
    }

    #[test]
    fn koch_curve_one_iteration() {
        let c = config_with("F", 1, &[('F', "F+F-F-F+F")]);
        assert_eq!(expand(&c, DEFAULT_WORD_CAP).word, "F+F-F-F+F");
    }

    #[test]
    fn two_iterations_compound() {
        let c = config_with("F", 2, &[('F', "F+F")]);
        assert_eq!(expand(&c, DEFAULT_WORD_CAP).word, "F+F+F+F");
    }

    #[test]
    fn symbols_without_rules_pass_through() {
        let c = config_with("F+F", 1, &[]);
        assert_eq!(expand(&c, DEFAULT_WORD_CAP).word, "F+F");
    }

    #[test]
    fn exceeding_cap_truncates_at_last_safe_iteration() {
        let c = config_with("F", 5, &[('F', "FF")]);
        let outcome = expand(&c, 10);
        // 1,2,4,8,16 -> stops once the next doubling would exceed 10
        assert_eq!(outcome.word, "FFFFFFFF");
        assert_eq!(outcome.truncated_at_iteration, Some(3));
    }
}
