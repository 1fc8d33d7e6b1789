use crate::kiosk::model::{NewSurveyResponse, PartnerFactor, Rating};
use crate::kiosk::questions::FOLLOWUP_YES;
use std::collections::{BTreeMap, BTreeSet};

/// 单选 / 文本题的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingleKey {
    Capacity,
    Seeking,
    Followup,
    Name,
    Company,
    Contact,
}

/// 多选题的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiKey {
    Sector,
    Solution,
    Challenges,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub company: String,
    pub contact: String,
}

/// 当前访客正在填写的问卷。修改时不做校验，校验统一在提交时进行。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyForm {
    pub sector: BTreeSet<String>,
    pub solution: BTreeSet<String>,
    pub capacity: String,
    pub challenges: BTreeSet<String>,
    pub ratings: BTreeMap<PartnerFactor, Rating>,
    pub seeking: String,
    pub followup: String,
    pub contact: ContactDetails,
}

impl SurveyForm {
    pub fn set_single(&mut self, key: SingleKey, value: impl Into<String>) {
        *self.single_mut(key) = value.into();
    }

    /// included=true 时加入集合，否则移除；重复调用结果不变
    pub fn toggle_multi(&mut self, key: MultiKey, value: &str, included: bool) {
        let set = self.multi_mut(key);
        if included {
            set.insert(value.to_string());
        } else {
            set.remove(value);
        }
    }

    pub fn set_rating(&mut self, factor: PartnerFactor, rating: Option<Rating>) {
        match rating {
            Some(r) => {
                self.ratings.insert(factor, r);
            }
            None => {
                self.ratings.remove(&factor);
            }
        }
    }

    pub fn reset(&mut self) {
        *self = SurveyForm::default();
    }

    pub fn single(&self, key: SingleKey) -> &str {
        match key {
            SingleKey::Capacity => &self.capacity,
            SingleKey::Seeking => &self.seeking,
            SingleKey::Followup => &self.followup,
            SingleKey::Name => &self.contact.name,
            SingleKey::Company => &self.contact.company,
            SingleKey::Contact => &self.contact.contact,
        }
    }

    pub fn multi(&self, key: MultiKey) -> &BTreeSet<String> {
        match key {
            MultiKey::Sector => &self.sector,
            MultiKey::Solution => &self.solution,
            MultiKey::Challenges => &self.challenges,
        }
    }

    pub fn rating(&self, factor: PartnerFactor) -> Option<Rating> {
        self.ratings.get(&factor).copied()
    }

    pub fn wants_followup(&self) -> bool {
        self.followup.trim() == FOLLOWUP_YES
    }

    /// 生成待写入快照；联系信息仅在选择跟进时保留
    pub fn to_response(&self) -> NewSurveyResponse {
        let (name, company, contact) = if self.wants_followup() {
            (
                Some(self.contact.name.trim().to_string()),
                Some(self.contact.company.trim().to_string()),
                Some(self.contact.contact.trim().to_string()),
            )
        } else {
            (None, None, None)
        };

        NewSurveyResponse {
            sector: self.sector.clone(),
            solution: self.solution.clone(),
            capacity: self.capacity.clone(),
            challenges: self.challenges.clone(),
            ratings: self.ratings.clone(),
            seeking: self.seeking.clone(),
            followup: self.followup.trim().to_string(),
            name,
            company,
            contact,
        }
    }

    fn single_mut(&mut self, key: SingleKey) -> &mut String {
        match key {
            SingleKey::Capacity => &mut self.capacity,
            SingleKey::Seeking => &mut self.seeking,
            SingleKey::Followup => &mut self.followup,
            SingleKey::Name => &mut self.contact.name,
            SingleKey::Company => &mut self.contact.company,
            SingleKey::Contact => &mut self.contact.contact,
        }
    }

    fn multi_mut(&mut self, key: MultiKey) -> &mut BTreeSet<String> {
        match key {
            MultiKey::Sector => &mut self.sector,
            MultiKey::Solution => &mut self.solution,
            MultiKey::Challenges => &mut self.challenges,
        }
    }
}
