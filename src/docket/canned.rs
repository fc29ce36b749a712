use super::Docket;
use super::DocketError;
use crate::debate::Case;
use crate::types::ID;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::Mutex;

/// Built-in case bank. Serves a random case per match so the server runs
/// self-contained without an external generator.
pub struct CannedDocket {
    rng: Mutex<SmallRng>,
}

impl Default for CannedDocket {
    fn default() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_os_rng()),
        }
    }
}

struct Entry {
    title: &'static str,
    description: &'static str,
    context: &'static str,
    attacker_side: &'static str,
    defender_side: &'static str,
}

const BANK: &[Entry] = &[
    Entry {
        title: "The State v. Mercer",
        description: "A warehouse fire destroyed a rival's stock the night before a merger vote.",
        context: "Mercer's badge opened the loading dock at 23:41. The sprinkler main had been shut off by hand. Mercer claims a night-shift inventory check.",
        attacker_side: "Prove Mercer set the fire to sink the merger.",
        defender_side: "Show the evidence is circumstantial and the shutdown routine.",
    },
    Entry {
        title: "Harlan Shipping v. Voss",
        description: "A chief engineer is accused of selling route schedules to pirates.",
        context: "Three hijackings matched unpublished routes. Voss's terminal exported the schedules, but four officers shared that cabin's console.",
        attacker_side: "Establish Voss as the only plausible source of the leak.",
        defender_side: "Demonstrate shared access and the absence of any payment trail.",
    },
    Entry {
        title: "In re the Alden Estate",
        description: "A new will, signed nine days before death, disinherits the elder daughter.",
        context: "The witnesses were the beneficiary's colleagues. The decedent's physician noted lucidity at every visit that month.",
        attacker_side: "Prove the will was procured by undue influence.",
        defender_side: "Show the decedent acted freely and the formalities were met.",
    },
    Entry {
        title: "The Crown v. Okafor",
        description: "A curator is charged with replacing a bronze with a forgery before an audit.",
        context: "The forgery's alloy matches a batch bought by the museum's own restoration lab. Okafor flagged the piece for testing twice and was overruled.",
        attacker_side: "Prove the swap happened on Okafor's watch and by her hand.",
        defender_side: "Show the swap predates her tenure and the audit trail was doctored.",
    },
];

#[async_trait::async_trait]
impl Docket for CannedDocket {
    async fn pull(&self) -> Result<Case, DocketError> {
        let pick = self.rng.lock().await.random_range(0..BANK.len());
        let entry = &BANK[pick];
        Ok(Case {
            id: ID::default(),
            title: entry.title.to_string(),
            description: entry.description.to_string(),
            context: entry.context.to_string(),
            attacker_side: entry.attacker_side.to_string(),
            defender_side: entry.defender_side.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pulls_a_complete_case() {
        let docket = CannedDocket::default();
        let case = docket.pull().await.unwrap();
        assert!(!case.title.is_empty());
        assert!(!case.attacker_side.is_empty());
        assert!(!case.defender_side.is_empty());
    }
}
