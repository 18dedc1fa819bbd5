use serde::Serialize;

/// Label of the entry that leaves the story field blank for free-form input.
pub const CUSTOM_INPUT_LABEL: &str = "None (Custom Input)";

const BEDROOM_LOCK: &str = "My brother in-law (Sammy) lost his home and moved in with us along with his twin daughters. They have no respect for my daughter Zoey's privacy and kept taking her things. Zoey bought a $60 makeup kit and one of the twins ruined it. My wife and Sammy saw no issue, saying 'girls borrow stuff.'
I installed a lock on Zoey's door. Sammy and his daughters were upset. My wife shamed me for putting a lock on Zoey's door, saying it prevents them from 'spending time' with her and implies we want to kick them out. She demanded I remove it, but I said the lock stays until they leave. Now everyone is giving me the silent treatment.";

const MEDICAL_BILL: &str = "My boyfriend went to the ER and got a $5000 bill. I offered to fight it. I went all-out: emailed the hospital board, investors, and management daily, pointing out their price gouging.
Result: The bill was dropped to $26. I saved us nearly $5000.
However, my boyfriend was furious. He looked at my emails and said I 'went too far' and 'harassed' the hospital. He said he authorized me to dispute the bill, not threaten the board. He is mad at me for being a hardass, even though I saved our holiday plans.";

const BACON_STANDOFF: &str = "My 14-year-old daughter decided to go vegan. I supported her, bought her special food and pans. But recently, she exploded because I cooked bacon in a 'family pan' (not hers).
She demanded I buy her separate pans, which I did. Now, she says the dishwasher is 'contaminated' and the fridge has 'bacon grease fingers' on it. She and my wife want me to completely stop cooking meat at home. I refused. I said I will not stop eating bacon in my own house. Now there is huge tension.";

pub const BUILTIN_CASES: &[(&str, &str)] = &[
    (CUSTOM_INPUT_LABEL, ""),
    ("1. The Bedroom Lock (Boundaries vs. Face)", BEDROOM_LOCK),
    ("2. The Medical Bill (Efficiency vs. Norms)", MEDICAL_BILL),
    ("3. The Bacon Standoff (Values Conflict)", BACON_STANDOFF),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub label: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseLibraryError {
    #[error("Scenario labels collide: '{first}' and '{second}'")]
    DuplicateLabel { first: String, second: String },

    #[error("Case library needs a custom-input entry with an empty story")]
    NoSentinel,
}

/// Fixed, insertion-ordered set of example stories.
#[derive(Debug, Clone)]
pub struct CaseLibrary {
    scenarios: Vec<Scenario>,
}

impl CaseLibrary {
    pub fn builtin() -> Result<Self, CaseLibraryError> {
        Self::new(BUILTIN_CASES)
    }

    pub fn new(entries: &[(&'static str, &'static str)]) -> Result<Self, CaseLibraryError> {
        let scenarios: Vec<Scenario> = entries
            .iter()
            .map(|&(label, body)| Scenario { label, body })
            .collect();

        for (i, a) in scenarios.iter().enumerate() {
            let key = normalize_label(a.label);
            if let Some(b) = scenarios[i + 1..]
                .iter()
                .find(|b| normalize_label(b.label) == key)
            {
                return Err(CaseLibraryError::DuplicateLabel {
                    first: a.label.to_string(),
                    second: b.label.to_string(),
                });
            }
        }

        if !scenarios.iter().any(|s| s.body.is_empty()) {
            return Err(CaseLibraryError::NoSentinel);
        }

        Ok(Self { scenarios })
    }

    /// Body for `label`; unknown labels read as custom input.
    pub fn lookup(&self, label: &str) -> &'static str {
        self.scenarios
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.body)
            .unwrap_or("")
    }

    /// The first custom-input entry, selected when the window opens.
    pub fn default_label(&self) -> &'static str {
        self.scenarios
            .iter()
            .find(|s| s.body.is_empty())
            .map(|s| s.label)
            .unwrap_or(CUSTOM_INPUT_LABEL)
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
