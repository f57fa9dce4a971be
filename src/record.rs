use serde::{Deserialize, Serialize};

use crate::cell::format_number;
use crate::config;

/// Canonical column order of the backing sheet
pub const COLUMNS: [&str; 12] = [
    "序号",
    "姓名",
    "性别",
    "年龄（岁）",
    "工单号",
    "工单费用",
    "工种",
    "是否参加面试",
    "初试时间",
    "复试时间",
    "押金（元）",
    "备注",
];

pub const SERIAL_COLUMN: &str = "序号";

/// Columns coerced to numbers on every read and before every overwrite
pub const NUMERIC_COLUMNS: [&str; 4] = ["序号", "年龄（岁）", "工单费用", "押金（元）"];

/// Position of a column in [`COLUMNS`]
pub fn column_index(name: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| *c == name)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "男")]
    Male,
    #[serde(rename = "女")]
    Female,
    #[serde(rename = "其他")]
    Other,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
            Gender::Other => "其他",
            Gender::Unspecified => "",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interview {
    #[serde(rename = "是")]
    Yes,
    #[serde(rename = "否")]
    No,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Interview {
    pub fn label(self) -> &'static str {
        match self {
            Interview::Yes => "是",
            Interview::No => "否",
            Interview::Unspecified => "",
        }
    }
}

/// One worker record as submitted by the add-record form
///
/// Field names on the wire are the canonical column names, so the form posts
/// the same keys the sheet header carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "序号")]
    pub serial: u32,
    #[serde(rename = "姓名", default)]
    pub name: String,
    #[serde(rename = "性别", default)]
    pub gender: Gender,
    #[serde(rename = "年龄（岁）")]
    pub age: u32,
    #[serde(rename = "工单号", default)]
    pub order_no: String,
    #[serde(rename = "工单费用")]
    pub fee: f64,
    #[serde(rename = "工种", default)]
    pub job_type: String,
    #[serde(rename = "是否参加面试", default)]
    pub interview: Interview,
    #[serde(rename = "初试时间", default)]
    pub first_interview: String,
    #[serde(rename = "复试时间", default)]
    pub second_interview: String,
    #[serde(rename = "押金（元）")]
    pub deposit: f64,
    #[serde(rename = "备注", default)]
    pub remark: String,
}

impl Record {
    /// Pre-filled add-record form for the given next serial
    pub fn draft(next_serial: u32) -> Self {
        Record {
            serial: next_serial,
            name: String::new(),
            gender: Gender::Male,
            age: config::DEFAULT_AGE,
            order_no: String::new(),
            fee: config::DEFAULT_FEE,
            job_type: String::new(),
            interview: Interview::Yes,
            first_interview: String::new(),
            second_interview: String::new(),
            deposit: config::DEFAULT_DEPOSIT,
            remark: String::new(),
        }
    }

    /// Check the form's numeric minimums
    pub fn check(&self) -> Result<(), String> {
        if self.serial < 1 {
            return Err("序号必须大于等于 1".to_string());
        }
        if !self.fee.is_finite() || self.fee < 0.0 {
            return Err("工单费用不能为负数".to_string());
        }
        if !self.deposit.is_finite() || self.deposit < 0.0 {
            return Err("押金不能为负数".to_string());
        }
        Ok(())
    }

    /// Positional row in canonical column order, as sent to the store
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.serial.to_string(),
            self.name.clone(),
            self.gender.label().to_string(),
            self.age.to_string(),
            self.order_no.clone(),
            format_number(self.fee),
            self.job_type.clone(),
            self.interview.label().to_string(),
            self.first_interview.clone(),
            self.second_interview.clone(),
            format_number(self.deposit),
            self.remark.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            name: "张三".to_string(),
            gender: Gender::Male,
            fee: 100.0,
            first_interview: "2025-12-14 10:00".to_string(),
            ..Record::draft(1)
        }
    }

    #[test]
    fn draft_carries_form_defaults() {
        let draft = Record::draft(7);
        assert_eq!(draft.serial, 7);
        assert_eq!(draft.age, 30);
        assert_eq!(draft.fee, 0.0);
        assert_eq!(draft.deposit, 0.0);
        assert_eq!(draft.gender, Gender::Male);
        assert_eq!(draft.interview, Interview::Yes);
    }

    #[test]
    fn absent_choices_stay_blank() {
        let json = r#"{"序号": 2, "年龄（岁）": 30, "工单费用": 0, "押金（元）": 0}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.gender, Gender::Unspecified);
        assert_eq!(record.interview, Interview::Unspecified);
        assert_eq!(record.to_row()[2], "");
    }

    #[test]
    fn row_follows_canonical_order() {
        let row = sample().to_row();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], "1");
        assert_eq!(row[1], "张三");
        assert_eq!(row[2], "男");
        assert_eq!(row[3], "30");
        assert_eq!(row[5], "100");
        assert_eq!(row[7], "是");
        assert_eq!(row[8], "2025-12-14 10:00");
        assert_eq!(row[10], "0");
    }

    #[test]
    fn deserializes_from_column_keys() {
        let json = r#"{"序号": 3, "姓名": "李四", "性别": "女", "年龄（岁）": 25,
            "工单费用": 50.5, "是否参加面试": "是", "押金（元）": 200}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.serial, 3);
        assert_eq!(record.gender, Gender::Female);
        assert_eq!(record.interview, Interview::Yes);
        assert_eq!(record.fee, 50.5);
        assert_eq!(record.remark, "");
    }

    #[test]
    fn rejects_form_minimum_violations() {
        assert!(sample().check().is_ok());
        assert!(Record { serial: 0, ..sample() }.check().is_err());
        assert!(Record { fee: -1.0, ..sample() }.check().is_err());
        assert!(Record { deposit: f64::NAN, ..sample() }.check().is_err());
    }

    #[test]
    fn numeric_columns_are_canonical() {
        for name in NUMERIC_COLUMNS {
            assert!(column_index(name).is_some());
        }
        assert_eq!(column_index(SERIAL_COLUMN), Some(0));
    }
}
