use super::Brief;
use super::Judge;
use super::JudgeError;
use super::Opinion;
use crate::types::Score;
use std::collections::HashSet;

/// Deterministic local scorer so the server runs without a remote
/// evaluator. Rewards substance over padding: distinct vocabulary,
/// sentence structure, and overlap with the case material.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicJudge;

impl HeuristicJudge {
    fn words(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn score(brief: &Brief) -> Score {
        let words = Self::words(&brief.argument);
        if words.is_empty() {
            return 0;
        }
        let distinct: HashSet<&String> = words.iter().collect();
        let sentences = brief
            .argument
            .matches(|c| matches!(c, '.' | '!' | '?'))
            .count();
        let material: HashSet<String> = Self::words(&brief.context)
            .into_iter()
            .chain(Self::words(&brief.side))
            .collect();
        let grounded = distinct.iter().filter(|w| material.contains(**w)).count();
        let substance = (distinct.len() * 2).min(60);
        let structure = (sentences * 5).min(15);
        let relevance = (grounded * 5).min(25);
        (substance + structure + relevance).min(100) as Score
    }
}

#[async_trait::async_trait]
impl Judge for HeuristicJudge {
    async fn review(&self, brief: Brief) -> Result<Opinion, JudgeError> {
        let score = Self::score(&brief);
        Ok(Opinion {
            score,
            analysis: format!("{} argument scored {} on substance and relevance", brief.role, score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::Role;

    fn brief(argument: &str) -> Brief {
        Brief {
            argument: argument.to_string(),
            role: Role::Attacker,
            side: "Prove the will was procured by undue influence.".to_string(),
            context: "The witnesses were the beneficiary's colleagues.".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_argument_scores_zero() {
        let opinion = HeuristicJudge.review(brief("   ")).await.unwrap();
        assert_eq!(opinion.score, 0);
    }

    #[tokio::test]
    async fn identical_input_scores_identically() {
        let text = "The witnesses were colleagues of the beneficiary. Influence is plain.";
        let a = HeuristicJudge.review(brief(text)).await.unwrap();
        let b = HeuristicJudge.review(brief(text)).await.unwrap();
        assert_eq!(a.score, b.score);
    }

    #[tokio::test]
    async fn grounded_prose_outscores_padding() {
        let grounded = HeuristicJudge
            .review(brief(
                "The witnesses were the beneficiary's colleagues. That alone taints the will.",
            ))
            .await
            .unwrap();
        let padding = HeuristicJudge
            .review(brief("very very very very very bad"))
            .await
            .unwrap();
        assert!(grounded.score > padding.score);
        assert!(grounded.score <= 100);
    }
}
