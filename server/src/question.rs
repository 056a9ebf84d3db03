use rand::seq::SliceRandom;
use rand::Rng;

use crate::groups::FunctionalGroup;

pub const QUESTION_ALT: &str = "Identify this functional group";

/// One trivia prompt: the group to identify and the shuffled answer buttons.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub group: FunctionalGroup,
    pub choices: Vec<String>,
}

impl Question {
    /// Pick a random group and up to `max_distractors` other display names.
    /// Returns None for an empty pool.
    pub fn draw(pool: &[FunctionalGroup], max_distractors: usize, rng: &mut impl Rng) -> Option<Self> {
        let group = pool.choose(rng)?.clone();
        let correct = group.display_name.clone();

        let mut shuffled: Vec<&FunctionalGroup> = pool.iter().collect();
        shuffled.shuffle(rng);
        let mut distractors: Vec<String> = Vec::with_capacity(max_distractors);
        for candidate in shuffled {
            if distractors.len() >= max_distractors {
                break;
            }
            if candidate.display_name == correct || distractors.contains(&candidate.display_name) {
                continue;
            }
            distractors.push(candidate.display_name.clone());
        }

        let mut choices = Vec::with_capacity(distractors.len() + 1);
        choices.push(correct);
        choices.extend(distractors);
        choices.shuffle(rng);
        Some(Self { group, choices })
    }

    /// Only the rendered choice carrying the group's display name is correct.
    pub fn is_correct(&self, answer: &str) -> bool {
        self.choices.iter().any(|choice| choice == answer) && answer == self.group.display_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::local_fallback_groups;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn group(name: &str) -> FunctionalGroup {
        FunctionalGroup {
            id: name.to_lowercase(),
            display_name: name.to_string(),
            image: format!("assets/groups/{}.svg", name.to_lowercase()),
            aliases: vec![name.to_lowercase()],
        }
    }

    #[test]
    fn empty_pool_gives_no_question() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(Question::draw(&[], 3, &mut rng).is_none());
    }

    #[test]
    fn choices_contain_answer_and_unique_distractors() {
        let pool: Vec<FunctionalGroup> = ["Alcohol", "Ketone", "Amine", "Ester", "Ether", "Amide"]
            .iter()
            .map(|n| group(n))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let q = Question::draw(&pool, 3, &mut rng).unwrap();
            assert_eq!(q.choices.len(), 4);
            assert!(q.choices.contains(&q.group.display_name));
            let mut sorted = q.choices.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), 4, "duplicate choice in {:?}", q.choices);
        }
    }

    #[test]
    fn duplicate_display_names_are_not_repeated() {
        let pool = vec![group("Alcohol"), group("Alcohol"), group("Ketone")];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let q = Question::draw(&pool, 3, &mut rng).unwrap();
            assert_eq!(q.choices.len(), 2);
        }
    }

    #[test]
    fn small_pool_limits_distractors() {
        let pool = local_fallback_groups();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let q = Question::draw(&pool, 3, &mut rng).unwrap();
        assert_eq!(q.choices.len(), 3);
    }

    #[test]
    fn answer_must_be_the_rendered_choice() {
        let pool = local_fallback_groups();
        let q = Question {
            group: pool[0].clone(),
            choices: vec!["Alcohol".to_string(), "Ketone".to_string(), "Amine".to_string()],
        };
        assert!(q.is_correct("Alcohol"));
        assert!(!q.is_correct("alcohol"));
        assert!(!q.is_correct("ALCOHOL"));
        assert!(!q.is_correct(" Alcohol "));
        assert!(!q.is_correct("hydroxyl"));
        assert!(!q.is_correct("Ketone"));
    }
}
