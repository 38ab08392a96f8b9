//! # Built-in recognizer model
//!
//! The model bundles:
//! - **CRF weights** set by hand from the patterns of the email corpus
//! - **Gazetteers** compiled from the corpus plus curated name lists
//! - **Rule engine** loaded with the same lists
//!
//! ## Where the weights come from
//!
//! The emission and transition weights encode the strongest regularities of
//! enterprise email: known names dominate, mid-sentence capitalisation leans
//! towards an entity, sentence openers ("Please", "Thanks", "Hi") and common
//! words lean strongly towards Outside. A weights file can replace them with
//! [`NerModel::with_weights_file`].

use std::path::Path;

use crate::corpus::extract_gazetteers_from_corpus;
use crate::crf::CrfModel;
use crate::error::{Error, Result};
use crate::features::Gazetteers;
use crate::rule_based::RuleEngine;
use crate::tagger::{EntityCategory, Tag};

pub struct NerModel {
    pub crf: CrfModel,
    pub rule_engine: RuleEngine,
    gazetteers: Gazetteers,
}

impl NerModel {
    /// Model with the built-in weights and gazetteers.
    pub fn build() -> Self {
        let mut rule_engine = RuleEngine::new();
        let gazetteers = build_gazetteers(&mut rule_engine);
        Self {
            crf: build_crf_model(),
            rule_engine,
            gazetteers,
        }
    }

    /// Built-in gazetteers and rules with CRF weights read from a JSON file.
    ///
    /// The file holds a serialized [`CrfModel`]; a transition matrix of the
    /// wrong shape is rejected.
    pub fn with_weights_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let crf: CrfModel = serde_json::from_str(&raw)?;
        if !crf.is_well_formed() {
            return Err(Error::InvalidWeights {
                path: path.to_path_buf(),
                expected: Tag::COUNT,
            });
        }
        tracing::info!(
            path = %path.display(),
            emissions = crf.emission_weights.len(),
            "Loaded CRF weights"
        );
        Ok(Self {
            crf,
            ..Self::build()
        })
    }

    pub fn gazetteers(&self) -> &Gazetteers {
        &self.gazetteers
    }
}

impl Default for NerModel {
    fn default() -> Self {
        Self::build()
    }
}

const WEEKDAYS_AND_MONTHS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "january", "february", "march", "april", "june", "july", "august", "september",
    "october", "november", "december", "jan.", "feb.", "mar.", "apr.", "jun.", "jul.",
    "aug.", "sep.", "sept.", "oct.", "nov.", "dec.",
];

/// Greetings and sign-offs that open a line but never name anyone
const SALUTATIONS: &[&str] = &[
    "hi", "hello", "hey", "dear", "thanks", "thank", "regards", "best", "cheers",
    "sincerely", "greetings", "good", "kind",
];

fn build_crf_model() -> CrfModel {
    let mut model = CrfModel::new();

    // --- PERSON ---
    // Capitalisation is a strong hint mid-sentence, weak at a sentence start.
    model.set_emission("is_capitalized", &Tag::Begin(EntityCategory::Person), 2.8);
    model.set_emission("is_capitalized", &Tag::Inside(EntityCategory::Person), 2.0);
    model.set_emission("is_capitalized", &Tag::Begin(EntityCategory::Org), 2.0);
    model.set_emission("is_capitalized", &Tag::Inside(EntityCategory::Org), 2.0);
    model.set_emission("is_capitalized", &Tag::Begin(EntityCategory::Loc), 1.5);
    model.set_emission("is_capitalized", &Tag::Begin(EntityCategory::Misc), 1.0);

    model.set_emission("sentence_start_cap", &Tag::Outside, 3.0);
    model.set_emission("sentence_start_cap", &Tag::Begin(EntityCategory::Person), -1.5);
    model.set_emission("sentence_start_cap", &Tag::Begin(EntityCategory::Org), -1.0);
    model.set_emission("sentence_start_cap", &Tag::Begin(EntityCategory::Loc), -1.0);
    model.set_emission("sentence_start_cap", &Tag::Begin(EntityCategory::Misc), -1.0);

    model.set_emission("in_first_name_gazetteer", &Tag::Begin(EntityCategory::Person), 5.0);
    model.set_emission("in_first_name_gazetteer", &Tag::Inside(EntityCategory::Person), 1.0);
    model.set_emission("in_surname_gazetteer", &Tag::Inside(EntityCategory::Person), 4.5);
    model.set_emission("in_surname_gazetteer", &Tag::Begin(EntityCategory::Person), 2.5);

    for title in ["mr", "mrs", "ms", "miss", "dr", "prof", "dear", "hi", "hello", "hey", "thanks"] {
        model.set_emission(
            &format!("prev_word={title}"),
            &Tag::Begin(EntityCategory::Person),
            2.5,
        );
    }
    // Sign-off: "Thanks, Maria"
    model.set_emission("prev_word=,", &Tag::Begin(EntityCategory::Person), 0.5);
    model.set_emission("EOS", &Tag::Inside(EntityCategory::Person), 0.5);

    // --- ORG ---
    model.set_emission("in_org_gazetteer", &Tag::Begin(EntityCategory::Org), 4.0);
    model.set_emission("in_org_gazetteer", &Tag::Inside(EntityCategory::Org), 4.0);
    for suffix in ["inc", "llc", "ltd", "corp", "co", "plc", "gmbh"] {
        model.set_emission(
            &format!("next_word={suffix}"),
            &Tag::Begin(EntityCategory::Org),
            3.0,
        );
        model.set_emission(&format!("word={suffix}"), &Tag::Inside(EntityCategory::Org), 4.0);
        model.set_emission(&format!("word={suffix}."), &Tag::Inside(EntityCategory::Org), 4.0);
    }
    for word in [
        "industries", "enterprises", "systems", "technologies", "solutions", "logistics",
        "holdings", "partners", "group", "bank", "labs", "traders",
    ] {
        model.set_emission(&format!("word={word}"), &Tag::Inside(EntityCategory::Org), 3.0);
    }
    for prev in ["at", "from", "with", "join", "joined", "left"] {
        model.set_emission(
            &format!("prev_word={prev}"),
            &Tag::Begin(EntityCategory::Org),
            0.8,
        );
    }
    model.set_emission("suffix4=tech", &Tag::Begin(EntityCategory::Org), 1.2);
    model.set_emission("suffix3=soft", &Tag::Begin(EntityCategory::Org), 1.2);

    // --- LOC ---
    model.set_emission("in_location_gazetteer", &Tag::Begin(EntityCategory::Loc), 5.0);
    model.set_emission("in_location_gazetteer", &Tag::Inside(EntityCategory::Loc), 4.0);
    model.set_emission("prev_word=in", &Tag::Begin(EntityCategory::Loc), 0.8);

    // --- MISC ---
    model.set_emission("in_misc_gazetteer", &Tag::Begin(EntityCategory::Misc), 4.5);
    model.set_emission("in_misc_gazetteer", &Tag::Inside(EntityCategory::Misc), 4.0);

    // --- Outside ---
    model.set_emission("bias", &Tag::Outside, 1.0);
    model.set_emission("BOS", &Tag::Outside, 0.5);
    model.set_emission("is_stop_word", &Tag::Outside, 4.0);
    model.set_emission("is_placeholder", &Tag::Outside, 10.0);
    model.set_emission("is_punctuation", &Tag::Outside, 5.0);
    model.set_emission("is_digit", &Tag::Outside, 2.0);
    model.set_emission("has_digit", &Tag::Outside, 1.5);
    // Acronyms in support mail (VPN, NDA, PDF) are mostly not names
    model.set_emission("is_all_caps", &Tag::Outside, 1.5);
    // The title itself stays outside the name it introduces
    for title in ["mr", "mrs", "ms", "dr", "prof", "rev"] {
        model.set_emission(&format!("word={title}."), &Tag::Outside, 5.0);
        model.set_emission(&format!("word={title}"), &Tag::Outside, 5.0);
    }
    for word in WEEKDAYS_AND_MONTHS {
        model.set_emission(&format!("word={word}"), &Tag::Outside, 4.0);
    }
    for word in SALUTATIONS {
        model.set_emission(&format!("word={word}"), &Tag::Outside, 4.0);
    }
    // Lowercase content words end a name instead of extending it
    model.set_emission("is_lower", &Tag::Outside, 5.0);
    model.set_emission("is_generic_word", &Tag::Outside, 5.0);
    for cat in [
        EntityCategory::Person,
        EntityCategory::Org,
        EntityCategory::Loc,
        EntityCategory::Misc,
    ] {
        model.set_emission("is_lower", &Tag::Begin(cat), -3.0);
        model.set_emission("is_lower", &Tag::Inside(cat), -4.0);
    }
    for cat in [EntityCategory::Person, EntityCategory::Org] {
        model.set_emission("is_generic_word", &Tag::Begin(cat), -3.0);
        model.set_emission("is_generic_word", &Tag::Inside(cat), -3.0);
    }

    // --- Transitions ---
    let tags = Tag::all();
    for prev in &tags {
        for next in &tags {
            if !Tag::is_valid_transition(prev, next) {
                model.set_transition(prev, next, -8.0);
            }
        }
    }

    for cat in [
        EntityCategory::Person,
        EntityCategory::Org,
        EntityCategory::Loc,
        EntityCategory::Misc,
    ] {
        let b = Tag::Begin(cat);
        let i = Tag::Inside(cat);
        model.set_transition(&b, &i, 4.0);
        model.set_transition(&i, &i, 3.0);
        model.set_transition(&b, &Tag::Outside, 2.0);
        model.set_transition(&i, &Tag::Outside, 2.5);
        model.set_transition(&Tag::Outside, &b, 1.5);
    }
    model.set_transition(&Tag::Outside, &Tag::Outside, 2.5);

    model
}

const EXTRA_FIRST_NAMES: &[&str] = &[
    "james", "john", "robert", "michael", "david", "richard", "joseph", "thomas",
    "charles", "christopher", "daniel", "matthew", "anthony", "steven", "andrew",
    "paul", "joshua", "kenneth", "kevin", "brian", "george", "timothy", "ronald",
    "jason", "jeffrey", "ryan", "jacob", "gary", "nicholas", "eric", "jonathan",
    "stephen", "larry", "justin", "scott", "brandon", "benjamin", "samuel", "peter",
    "alexander", "patrick", "jack", "dennis", "tyler", "aaron", "adam", "nathan",
    "henry", "zachary", "kyle", "ethan", "jeremy", "christian", "sean", "carlos",
    "luis", "juan", "ahmed", "mohammed", "omar", "raj", "arjun", "wei", "hiroshi",
    "mary", "patricia", "jennifer", "linda", "elizabeth", "barbara", "susan",
    "jessica", "sarah", "karen", "lisa", "nancy", "betty", "sandra", "margaret",
    "ashley", "kimberly", "emily", "donna", "michelle", "carol", "amanda", "melissa",
    "deborah", "stephanie", "rebecca", "sharon", "laura", "cynthia", "amy",
    "angela", "anna", "brenda", "pamela", "emma", "nicole", "helen", "samantha",
    "katherine", "christine", "rachel", "catherine", "maria", "heather", "diane",
    "julie", "olivia", "sophia", "priya", "anita", "fatima", "aisha", "mei", "yuki",
    "elena", "sofia", "lucia", "ana", "chloe", "natalie",
];

const EXTRA_SURNAMES: &[&str] = &[
    "smith", "johnson", "williams", "jones", "davis", "miller", "wilson", "moore",
    "taylor", "anderson", "jackson", "harris", "martin", "thompson",
    "garcia", "martinez", "robinson", "clark", "rodriguez", "lewis", "lee",
    "walker", "allen", "hernandez", "wright", "lopez",
    "scott", "adams", "baker", "gonzalez", "nelson", "carter",
    "mitchell", "perez", "roberts", "turner", "phillips", "campbell", "parker",
    "evans", "edwards", "collins", "stewart", "sanchez", "morris", "rogers",
    "morgan", "murphy", "bailey", "cooper",
    "richardson", "howard", "torres", "peterson", "ramirez",
    "watson", "kelly", "sanders", "bennett", "barnes",
    "ross", "henderson", "coleman", "jenkins", "perry", "powell",
    "patterson", "hughes", "flores", "washington", "butler", "simmons", "foster",
    "gonzales", "bryant", "alexander", "russell", "griffin", "diaz", "hayes",
    "brown", "patel", "nguyen", "kim", "chen", "wang", "singh", "kumar", "khan",
    "ali", "tanaka", "sato", "müller", "schmidt", "rossi", "silva", "nair",
];

const EXTRA_ORGS: &[&str] = &[
    "Microsoft", "Google", "Amazon", "Oracle", "IBM", "Salesforce", "Cisco",
    "Intel", "Adobe", "SAP", "Deloitte", "Accenture", "KPMG", "PwC",
    "Goldman Sachs", "JPMorgan Chase", "Wells Fargo", "Bank of America",
    "FedEx", "UPS", "DHL", "Verizon", "Comcast", "Stripe", "PayPal",
    "Contoso", "Fabrikam", "Tailspin Toys", "Wide World Importers",
];

const EXTRA_LOCATIONS: &[&str] = &[
    "London", "Paris", "Berlin", "Madrid", "Dublin", "Amsterdam", "Toronto",
    "Chicago", "Boston", "Dallas", "Seattle", "Denver", "Austin", "Atlanta",
    "New York", "San Francisco", "Los Angeles", "Singapore", "Tokyo", "Sydney",
    "Bangalore", "Mumbai", "Texas", "California", "Canada", "Germany", "India",
];

const EXTRA_MISC: &[&str] = &[
    "Windows", "Outlook", "Excel", "Teams", "Zoom", "Slack", "Jira", "Confluence",
    "SharePoint", "macOS", "Linux", "Android", "iPhone", "Chrome",
];

/// Fills the gazetteers and the rule engine from the corpus and curated lists.
fn build_gazetteers(rule_engine: &mut RuleEngine) -> Gazetteers {
    let entities = extract_gazetteers_from_corpus();
    let mut gaz = Gazetteers::new();

    // "john smith": first word is a first name, the rest surnames
    for person in &entities.persons {
        let mut words = person.split_whitespace();
        if let Some(first) = words.next() {
            add_first_name(&mut gaz, rule_engine, first);
        }
        for word in words {
            add_surname(&mut gaz, rule_engine, word);
        }
    }
    for name in EXTRA_FIRST_NAMES {
        add_first_name(&mut gaz, rule_engine, name);
    }
    for name in EXTRA_SURNAMES {
        add_surname(&mut gaz, rule_engine, name);
    }

    let orgs = entities.orgs.iter().map(String::as_str).chain(EXTRA_ORGS.iter().copied());
    for org in orgs {
        for word in org.split_whitespace() {
            let word = word.to_lowercase();
            let word = word.trim_end_matches('.');
            if word.len() > 2 {
                gaz.organizations.insert(word.to_string());
            }
        }
        rule_engine.add_org(org);
    }

    let locations = entities
        .locations
        .iter()
        .map(String::as_str)
        .chain(EXTRA_LOCATIONS.iter().copied());
    for loc in locations {
        for word in loc.split_whitespace() {
            gaz.locations.insert(word.to_lowercase());
        }
        rule_engine.add_location(loc);
    }

    let misc = entities.misc.iter().map(String::as_str).chain(EXTRA_MISC.iter().copied());
    for m in misc {
        gaz.misc.insert(m.to_lowercase());
    }

    gaz
}

fn add_first_name(gaz: &mut Gazetteers, rule_engine: &mut RuleEngine, name: &str) {
    if gaz.first_names.insert(name.to_lowercase()) {
        rule_engine.add_first_name(name);
    }
}

fn add_surname(gaz: &mut Gazetteers, rule_engine: &mut RuleEngine, name: &str) {
    if gaz.surnames.insert(name.to_lowercase()) {
        rule_engine.add_surname(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_has_gazetteers() {
        let model = NerModel::build();
        let gaz = model.gazetteers();
        assert!(gaz.first_names.contains("john"));
        assert!(gaz.surnames.contains("smith"));
        assert!(gaz.organizations.contains("globex"));
        assert!(gaz.locations.contains("chicago"));
        assert!(model.crf.is_well_formed());
    }

    #[test]
    fn test_weights_file_replaces_crf() {
        let mut crf = CrfModel::new();
        crf.set_emission("bias", &Tag::Outside, 7.0);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&crf).unwrap().as_bytes()).unwrap();

        let model = NerModel::with_weights_file(file.path()).unwrap();
        assert_eq!(model.crf.emission_weights.len(), 1);
        assert!(model.gazetteers().first_names.contains("john"));
    }

    #[test]
    fn test_weights_file_wrong_shape() {
        let crf = CrfModel {
            emission_weights: Default::default(),
            transition_weights: vec![vec![0.0; 3]; 3],
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&crf).unwrap().as_bytes()).unwrap();

        let err = NerModel::with_weights_file(file.path()).err().unwrap();
        assert!(matches!(err, Error::InvalidWeights { expected: 9, .. }));
    }

    #[test]
    fn test_weights_file_missing() {
        let err = NerModel::with_weights_file(Path::new("/nonexistent/weights.json"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::ReadFile { .. }));
    }
}
