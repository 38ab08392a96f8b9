//! # Annotated email corpus
//!
//! Short BIO-annotated sentences in the register of enterprise email
//! (support tickets, invoices, meeting notes). The corpus seeds the
//! gazetteers of the built-in model and serves as a regression set for the
//! recognizer.

use std::collections::BTreeSet;

use crate::tagger::Tag;

/// A sentence annotated in BIO format.
pub struct AnnotatedSentence {
    pub text: &'static str,
    /// Topic of the email the sentence was taken from
    pub domain: &'static str,
    /// `(token, tag)` pairs, one per token of [`crate::tokenizer::tokenize`]
    pub annotations: &'static [(&'static str, &'static str)],
}

pub fn get_corpus() -> Vec<AnnotatedSentence> {
    vec![
        // ===== SUPPORT =====
        AnnotatedSentence {
            text: "Please call John Smith at [PHONE].",
            domain: "support",
            annotations: &[
                ("Please", "O"), ("call", "O"), ("John", "B-PERSON"), ("Smith", "I-PERSON"),
                ("at", "O"), ("[", "O"), ("PHONE", "O"), ("]", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "I reset the password for Emily Davis this morning.",
            domain: "support",
            annotations: &[
                ("I", "O"), ("reset", "O"), ("the", "O"), ("password", "O"), ("for", "O"),
                ("Emily", "B-PERSON"), ("Davis", "I-PERSON"), ("this", "O"), ("morning", "O"),
                (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Can David Lee reset my VPN access before Monday?",
            domain: "support",
            annotations: &[
                ("Can", "O"), ("David", "B-PERSON"), ("Lee", "I-PERSON"), ("reset", "O"),
                ("my", "O"), ("VPN", "O"), ("access", "O"), ("before", "O"), ("Monday", "O"),
                ("?", "O"),
            ],
        },
        AnnotatedSentence {
            text: "James O'Neill reported a bug in the Windows client.",
            domain: "support",
            annotations: &[
                ("James", "B-PERSON"), ("O'Neill", "I-PERSON"), ("reported", "O"), ("a", "O"),
                ("bug", "O"), ("in", "O"), ("the", "O"), ("Windows", "B-MISC"),
                ("client", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The server outage affected customers in Chicago and Boston.",
            domain: "support",
            annotations: &[
                ("The", "O"), ("server", "O"), ("outage", "O"), ("affected", "O"),
                ("customers", "O"), ("in", "O"), ("Chicago", "B-LOC"), ("and", "O"),
                ("Boston", "B-LOC"), (".", "O"),
            ],
        },
        // ===== BILLING =====
        AnnotatedSentence {
            text: "Hi Sarah, the invoice from Globex Corp. is attached.",
            domain: "billing",
            annotations: &[
                ("Hi", "O"), ("Sarah", "B-PERSON"), (",", "O"), ("the", "O"), ("invoice", "O"),
                ("from", "O"), ("Globex", "B-ORG"), ("Corp.", "I-ORG"), ("is", "O"),
                ("attached", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Michael Chen from Acme Logistics approved the refund request.",
            domain: "billing",
            annotations: &[
                ("Michael", "B-PERSON"), ("Chen", "I-PERSON"), ("from", "O"),
                ("Acme", "B-ORG"), ("Logistics", "I-ORG"), ("approved", "O"), ("the", "O"),
                ("refund", "O"), ("request", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The payment to Northwind Traders failed twice yesterday.",
            domain: "billing",
            annotations: &[
                ("The", "O"), ("payment", "O"), ("to", "O"), ("Northwind", "B-ORG"),
                ("Traders", "I-ORG"), ("failed", "O"), ("twice", "O"), ("yesterday", "O"),
                (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Ms. Kim at Vandelay Industries confirmed the delivery.",
            domain: "billing",
            annotations: &[
                ("Ms.", "O"), ("Kim", "B-PERSON"), ("at", "O"), ("Vandelay", "B-ORG"),
                ("Industries", "I-ORG"), ("confirmed", "O"), ("the", "O"), ("delivery", "O"),
                (".", "O"),
            ],
        },
        // ===== LEGAL =====
        AnnotatedSentence {
            text: "Hooli Inc. has requested a meeting with our legal team.",
            domain: "legal",
            annotations: &[
                ("Hooli", "B-ORG"), ("Inc.", "I-ORG"), ("has", "O"), ("requested", "O"),
                ("a", "O"), ("meeting", "O"), ("with", "O"), ("our", "O"), ("legal", "O"),
                ("team", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Wayne Enterprises sent the signed NDA to Jessica Jones.",
            domain: "legal",
            annotations: &[
                ("Wayne", "B-ORG"), ("Enterprises", "I-ORG"), ("sent", "O"), ("the", "O"),
                ("signed", "O"), ("NDA", "O"), ("to", "O"), ("Jessica", "B-PERSON"),
                ("Jones", "I-PERSON"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Our contract with Initech expires in March.",
            domain: "legal",
            annotations: &[
                ("Our", "O"), ("contract", "O"), ("with", "O"), ("Initech", "B-ORG"),
                ("expires", "O"), ("in", "O"), ("March", "O"), (".", "O"),
            ],
        },
        // ===== OPERATIONS =====
        AnnotatedSentence {
            text: "Dr. Anita Patel will join the call from our London office.",
            domain: "operations",
            annotations: &[
                ("Dr.", "O"), ("Anita", "B-PERSON"), ("Patel", "I-PERSON"), ("will", "O"),
                ("join", "O"), ("the", "O"), ("call", "O"), ("from", "O"), ("our", "O"),
                ("London", "B-LOC"), ("office", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Our team in Berlin escalated the ticket to Umbrella Corp. support.",
            domain: "operations",
            annotations: &[
                ("Our", "O"), ("team", "O"), ("in", "O"), ("Berlin", "B-LOC"),
                ("escalated", "O"), ("the", "O"), ("ticket", "O"), ("to", "O"),
                ("Umbrella", "B-ORG"), ("Corp.", "I-ORG"), ("support", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Dear Mr. Wilson, your order has shipped from our Dallas warehouse.",
            domain: "operations",
            annotations: &[
                ("Dear", "O"), ("Mr.", "O"), ("Wilson", "B-PERSON"), (",", "O"),
                ("your", "O"), ("order", "O"), ("has", "O"), ("shipped", "O"), ("from", "O"),
                ("our", "O"), ("Dallas", "B-LOC"), ("warehouse", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The quarterly review with Cyberdyne Systems moved to Tuesday.",
            domain: "operations",
            annotations: &[
                ("The", "O"), ("quarterly", "O"), ("review", "O"), ("with", "O"),
                ("Cyberdyne", "B-ORG"), ("Systems", "I-ORG"), ("moved", "O"), ("to", "O"),
                ("Tuesday", "O"), (".", "O"),
            ],
        },
        // ===== HR =====
        AnnotatedSentence {
            text: "Thanks, Maria Garcia",
            domain: "hr",
            annotations: &[
                ("Thanks", "O"), (",", "O"), ("Maria", "B-PERSON"), ("Garcia", "I-PERSON"),
            ],
        },
        AnnotatedSentence {
            text: "Robert Taylor left Stark Industries last year.",
            domain: "hr",
            annotations: &[
                ("Robert", "B-PERSON"), ("Taylor", "I-PERSON"), ("left", "O"),
                ("Stark", "B-ORG"), ("Industries", "I-ORG"), ("last", "O"), ("year", "O"),
                (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Ask Linda Martinez in accounting about the Zoom license.",
            domain: "hr",
            annotations: &[
                ("Ask", "O"), ("Linda", "B-PERSON"), ("Martinez", "I-PERSON"), ("in", "O"),
                ("accounting", "O"), ("about", "O"), ("the", "O"), ("Zoom", "B-MISC"),
                ("license", "O"), (".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Please forward the Outlook invite to Mr. Brown by Friday.",
            domain: "hr",
            annotations: &[
                ("Please", "O"), ("forward", "O"), ("the", "O"), ("Outlook", "B-MISC"),
                ("invite", "O"), ("to", "O"), ("Mr.", "O"), ("Brown", "B-PERSON"), ("by", "O"),
                ("Friday", "O"), (".", "O"),
            ],
        },
    ]
}

/// Entity strings found in the corpus, lowercased and grouped by category.
#[derive(Debug, Default)]
pub struct CorpusEntities {
    pub persons: Vec<String>,
    pub orgs: Vec<String>,
    pub locations: Vec<String>,
    pub misc: Vec<String>,
}

/// Collects every annotated entity of the corpus, as the words joined by a
/// single space.
pub fn extract_gazetteers_from_corpus() -> CorpusEntities {
    let mut persons = BTreeSet::new();
    let mut orgs = BTreeSet::new();
    let mut locations = BTreeSet::new();
    let mut misc = BTreeSet::new();

    for sentence in get_corpus() {
        let mut current: Vec<&str> = vec![];
        let mut current_tag: Option<Tag> = None;

        // A trailing "O" closes the last entity of the sentence.
        let closing = [("", "O")];
        for &(word, label) in sentence.annotations.iter().chain(closing.iter()) {
            let tag = Tag::from_label(label).unwrap_or(Tag::Outside);
            if matches!(tag, Tag::Inside(_)) && current_tag.is_some() {
                current.push(word);
                continue;
            }

            if let Some(open) = current_tag.take() {
                let entity = current.join(" ").to_lowercase();
                match open.category().map(|c| c.name()) {
                    Some("PERSON") => persons.insert(entity),
                    Some("ORG") => orgs.insert(entity),
                    Some("LOC") => locations.insert(entity),
                    Some("MISC") => misc.insert(entity),
                    _ => false,
                };
                current.clear();
            }

            if matches!(tag, Tag::Begin(_)) {
                current.push(word);
                current_tag = Some(tag);
            }
        }
    }

    CorpusEntities {
        persons: persons.into_iter().collect(),
        orgs: orgs.into_iter().collect(),
        locations: locations.into_iter().collect(),
        misc: misc.into_iter().collect(),
    }
}

/// Sample emails offered by the browser client
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Support",
            "Hi team, my laptop will not connect to the VPN since this morning. Please call John Smith at 555-0199 or email john.smith@example.com if you need remote access.",
        ),
        (
            "Billing",
            "Dear Billing, the invoice from Globex Corp. was charged twice on our card. Could Maria Garcia issue a refund? You can reach her at 312.555.0142.",
        ),
        (
            "Legal",
            "Hello, Hooli Inc. has sent a revised NDA for review. Dr. Anita Patel from our legal team needs it signed by Friday.",
        ),
        (
            "Sales",
            "Good afternoon, I would like a quote for 40 enterprise licenses for Initech. Contact me at priya.nair@initech.com.",
        ),
    ]
}
