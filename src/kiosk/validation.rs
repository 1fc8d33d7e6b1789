use crate::kiosk::form::SurveyForm;
use crate::kiosk::questions::{FOLLOWUP_NO, FOLLOWUP_YES};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    #[error("please select at least one sector")]
    MissingSector,
    #[error("please select at least one power solution")]
    MissingSolution,
    #[error("please select a capacity range")]
    MissingCapacity,
    #[error("please tell us whether you are seeking a provider")]
    MissingSeeking,
    #[error("please choose whether we should follow up")]
    MissingFollowup,
    #[error("follow-up answer must be Yes or No")]
    InvalidFollowup,
    #[error("please enter your name")]
    MissingName,
    #[error("please enter your company")]
    MissingCompany,
    #[error("please enter your email, phone or WhatsApp")]
    MissingContact,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// 返回所有未满足的约束，空列表表示可以提交
pub fn validate(form: &SurveyForm) -> Vec<Violation> {
    let mut violations = Vec::new();

    if form.sector.is_empty() {
        violations.push(Violation::MissingSector);
    }
    if form.solution.is_empty() {
        violations.push(Violation::MissingSolution);
    }
    if blank(&form.capacity) {
        violations.push(Violation::MissingCapacity);
    }
    if blank(&form.seeking) {
        violations.push(Violation::MissingSeeking);
    }

    match form.followup.trim() {
        "" => violations.push(Violation::MissingFollowup),
        FOLLOWUP_NO => {}
        FOLLOWUP_YES => {
            if blank(&form.contact.name) {
                violations.push(Violation::MissingName);
            }
            if blank(&form.contact.company) {
                violations.push(Violation::MissingCompany);
            }
            if blank(&form.contact.contact) {
                violations.push(Violation::MissingContact);
            }
        }
        _ => violations.push(Violation::InvalidFollowup),
    }

    violations
}

/// 拼接成一条提示给访客
pub fn summarize(violations: &[Violation]) -> String {
    let parts: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
    format!("Please complete all required fields: {}", parts.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kiosk::form::{MultiKey, SingleKey};

    fn complete_form() -> SurveyForm {
        let mut form = SurveyForm::default();
        form.toggle_multi(MultiKey::Sector, "Mining", true);
        form.toggle_multi(MultiKey::Solution, "Temporary / Rental Power", true);
        form.set_single(SingleKey::Capacity, "Below 1 MW");
        form.set_single(SingleKey::Seeking, "Not at the moment");
        form.set_single(SingleKey::Followup, "No");
        form
    }

    #[test]
    fn complete_form_passes() {
        assert!(validate(&complete_form()).is_empty());
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let v = validate(&SurveyForm::default());
        assert_eq!(
            v,
            vec![
                Violation::MissingSector,
                Violation::MissingSolution,
                Violation::MissingCapacity,
                Violation::MissingSeeking,
                Violation::MissingFollowup,
            ]
        );
    }

    #[test]
    fn each_required_field_is_checked() {
        let mut f = complete_form();
        f.toggle_multi(MultiKey::Sector, "Mining", false);
        assert_eq!(validate(&f), vec![Violation::MissingSector]);

        let mut f = complete_form();
        f.toggle_multi(MultiKey::Solution, "Temporary / Rental Power", false);
        assert_eq!(validate(&f), vec![Violation::MissingSolution]);

        let mut f = complete_form();
        f.set_single(SingleKey::Capacity, "   ");
        assert_eq!(validate(&f), vec![Violation::MissingCapacity]);

        let mut f = complete_form();
        f.set_single(SingleKey::Seeking, "");
        assert_eq!(validate(&f), vec![Violation::MissingSeeking]);

        let mut f = complete_form();
        f.set_single(SingleKey::Followup, "Maybe");
        assert_eq!(validate(&f), vec![Violation::InvalidFollowup]);
    }

    #[test]
    fn followup_yes_requires_contact_block() {
        let mut f = complete_form();
        f.set_single(SingleKey::Followup, "Yes");
        assert_eq!(
            validate(&f),
            vec![
                Violation::MissingName,
                Violation::MissingCompany,
                Violation::MissingContact
            ]
        );

        f.set_single(SingleKey::Name, "Dana");
        f.set_single(SingleKey::Company, "Acme Mining");
        assert_eq!(validate(&f), vec![Violation::MissingContact]);

        f.set_single(SingleKey::Contact, "+971 50 000 0000");
        assert!(validate(&f).is_empty());
    }

    #[test]
    fn optional_fields_do_not_matter() {
        let mut f = complete_form();
        f.toggle_multi(MultiKey::Challenges, "Other", true);
        f.set_single(SingleKey::Name, "ignored without follow-up");
        assert!(validate(&f).is_empty());
    }

    #[test]
    fn summary_lists_messages() {
        let s = summarize(&[Violation::MissingSector, Violation::MissingContact]);
        assert!(s.contains("sector"));
        assert!(s.contains("WhatsApp"));
    }
}
