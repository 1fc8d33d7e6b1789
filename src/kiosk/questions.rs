use crate::kiosk::form::{MultiKey, SingleKey};
use crate::kiosk::model::PartnerFactor;

pub const FOLLOWUP_YES: &str = "Yes";
pub const FOLLOWUP_NO: &str = "No";

pub const SECTORS: &[&str] = &[
    "Mining",
    "Construction",
    "Oil & Gas",
    "Manufacturing / Cement",
    "Data Centers / IT",
    "Events & Entertainment",
    "Utilities / Government",
    "Healthcare",
    "Other",
];

pub const SOLUTIONS: &[&str] = &[
    "Temporary / Rental Power",
    "Long-term Power Projects",
    "Renewable / Hybrid Energy",
    "Emergency Backup Power",
    "Other",
];

pub const CAPACITIES: &[&str] = &["Below 1 MW", "1 – 10 MW", "10 – 50 MW", "Above 50 MW"];

pub const CHALLENGES: &[&str] = &[
    "Reliability / Frequent Outages",
    "High Power Costs",
    "Sustainability & ESG Goals",
    "Scalability / Meeting Demand",
    "Speed of Deployment",
    "Service & Maintenance Quality",
    "Other",
];

pub const SEEKING: &[&str] = &[
    "Yes, urgently",
    "Yes, within the next 6 months",
    "Exploring options for the future",
    "Not at the moment",
];

pub const FOLLOWUP: &[&str] = &[FOLLOWUP_YES, FOLLOWUP_NO];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Multi(MultiKey),
    Single(SingleKey),
    Ratings,
}

#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub title: &'static str,
    pub kind: QuestionKind,
    pub options: &'static [&'static str],
}

/// 问卷题目顺序与展示文案
pub const QUESTIONS: &[Question] = &[
    Question {
        title: "1. Which sector best describes your business?",
        kind: QuestionKind::Multi(MultiKey::Sector),
        options: SECTORS,
    },
    Question {
        title: "2. What type of power solution do you usually require?",
        kind: QuestionKind::Multi(MultiKey::Solution),
        options: SOLUTIONS,
    },
    Question {
        title: "3. What capacity range do you typically need?",
        kind: QuestionKind::Single(SingleKey::Capacity),
        options: CAPACITIES,
    },
    Question {
        title: "4. What challenges matter most to you today?",
        kind: QuestionKind::Multi(MultiKey::Challenges),
        options: CHALLENGES,
    },
    Question {
        title: "5. When choosing a power partner, how important are the following? (1 = Not Important, 5 = Very Important)",
        kind: QuestionKind::Ratings,
        options: &[],
    },
    Question {
        title: "6. Are you currently seeking a power solution provider?",
        kind: QuestionKind::Single(SingleKey::Seeking),
        options: SEEKING,
    },
    Question {
        title: "7. Would you like Altaaqa to follow up with a tailored solution?",
        kind: QuestionKind::Single(SingleKey::Followup),
        options: FOLLOWUP,
    },
];

/// 跟进联系表单的字段及占位文案
pub const CONTACT_FIELDS: &[(SingleKey, &str)] = &[
    (SingleKey::Name, "Name"),
    (SingleKey::Company, "Company"),
    (SingleKey::Contact, "Email / Phone / WhatsApp"),
];

pub fn rating_factors() -> &'static [PartnerFactor] {
    &PartnerFactor::ALL
}
