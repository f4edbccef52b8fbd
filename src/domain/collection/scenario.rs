//! Scenario classification for a requested call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of call purpose. Shapes both the collection dialogue and the
/// call script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioType {
    Reservation,
    Inquiry,
    AsRequest,
}

impl ScenarioType {
    pub const ALL: [ScenarioType; 3] = [
        ScenarioType::Reservation,
        ScenarioType::Inquiry,
        ScenarioType::AsRequest,
    ];

    /// Wire name, e.g. `AS_REQUEST`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::Reservation => "RESERVATION",
            ScenarioType::Inquiry => "INQUIRY",
            ScenarioType::AsRequest => "AS_REQUEST",
        }
    }

    /// Korean label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioType::Reservation => "예약",
            ScenarioType::Inquiry => "문의",
            ScenarioType::AsRequest => "AS 요청",
        }
    }

    /// Lenient parse used for model output: case-insensitive, accepts
    /// hyphens or spaces in place of underscores.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = normalize_token(raw);
        Self::ALL.into_iter().find(|s| s.as_str() == normalized)
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer-grained scenario chosen up front by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioSubType {
    Restaurant,
    Salon,
    Hospital,
    Property,
    BusinessHours,
    Price,
    Appliance,
    Repair,
    Other,
}

impl ScenarioSubType {
    pub const ALL: [ScenarioSubType; 9] = [
        ScenarioSubType::Restaurant,
        ScenarioSubType::Salon,
        ScenarioSubType::Hospital,
        ScenarioSubType::Property,
        ScenarioSubType::BusinessHours,
        ScenarioSubType::Price,
        ScenarioSubType::Appliance,
        ScenarioSubType::Repair,
        ScenarioSubType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioSubType::Restaurant => "RESTAURANT",
            ScenarioSubType::Salon => "SALON",
            ScenarioSubType::Hospital => "HOSPITAL",
            ScenarioSubType::Property => "PROPERTY",
            ScenarioSubType::BusinessHours => "BUSINESS_HOURS",
            ScenarioSubType::Price => "PRICE",
            ScenarioSubType::Appliance => "APPLIANCE",
            ScenarioSubType::Repair => "REPAIR",
            ScenarioSubType::Other => "OTHER",
        }
    }

    /// Whether this sub-type may be paired with the given scenario.
    /// `Other` pairs with every scenario.
    pub fn belongs_to(&self, scenario: ScenarioType) -> bool {
        use ScenarioSubType::*;
        match self {
            Restaurant | Salon | Hospital => scenario == ScenarioType::Reservation,
            Property | BusinessHours | Price => scenario == ScenarioType::Inquiry,
            Appliance | Repair => scenario == ScenarioType::AsRequest,
            Other => true,
        }
    }

    /// Extra collection guidance appended to the assistant instruction.
    pub fn guidance(&self) -> &'static str {
        match self {
            ScenarioSubType::Restaurant => {
                "식당 예약이에요. 인원수(party_size)와 예약자 이름을 꼭 확인하고, 좌석 요청이 있으면 special_request에 담아주세요."
            }
            ScenarioSubType::Salon => {
                "미용실 예약이에요. 받을 시술(service)과 원하는 디자이너가 있는지 확인해주세요."
            }
            ScenarioSubType::Hospital => {
                "병원 예약이에요. 진료 과목이나 증상을 service 또는 special_request에 담아주세요."
            }
            ScenarioSubType::Property => {
                "매물 문의예요. 매물이 아직 있는지, 가격과 방문 가능 시간 등 물어볼 내용을 special_request에 정리해주세요."
            }
            ScenarioSubType::BusinessHours => "영업시간 문의예요. 확인하고 싶은 날짜를 물어봐주세요.",
            ScenarioSubType::Price => "가격 문의예요. 어떤 상품이나 서비스의 가격인지 service에 담아주세요.",
            ScenarioSubType::Appliance => {
                "가전 AS 요청이에요. 제품명은 service에, 고장 증상은 special_request에 담아주세요."
            }
            ScenarioSubType::Repair => {
                "수리 요청이에요. 수리할 대상과 증상, 방문 희망 시간을 확인해주세요."
            }
            ScenarioSubType::Other => "사용자가 원하는 용건을 자유롭게 정리해주세요.",
        }
    }

    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = normalize_token(raw);
        Self::ALL.into_iter().find(|s| s.as_str() == normalized)
    }
}

impl fmt::Display for ScenarioSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the voice agent should do when the requested time is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackAction {
    AskAvailable,
    NextDay,
    Cancel,
}

impl FallbackAction {
    pub const ALL: [FallbackAction; 3] = [
        FallbackAction::AskAvailable,
        FallbackAction::NextDay,
        FallbackAction::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackAction::AskAvailable => "ASK_AVAILABLE",
            FallbackAction::NextDay => "NEXT_DAY",
            FallbackAction::Cancel => "CANCEL",
        }
    }

    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = normalize_token(raw);
        Self::ALL.into_iter().find(|a| a.as_str() == normalized)
    }
}

impl fmt::Display for FallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}
