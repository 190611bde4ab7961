//! Typed single-field updates to a [`ReportData`].
//!
//! Logo fields are absent. They change only through the logo operations on
//! [`ReportData`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::report::{DemandSegment, PricePoint, Property, ReportData};

/// Names of the fields a [`FieldUpdate`] can replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportField {
    CompanyName,
    ReportTitle,
    Subtitle,
    Date,
    AgentName,
    Website,
    HeroImage,
    LogoColor,
    IntroText,
    MarketTrendText,
    ConclusionText,
    Properties,
    PricesData,
    DemandData,
}

impl ReportField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompanyName => "companyName",
            Self::ReportTitle => "reportTitle",
            Self::Subtitle => "subtitle",
            Self::Date => "date",
            Self::AgentName => "agentName",
            Self::Website => "website",
            Self::HeroImage => "heroImage",
            Self::LogoColor => "logoColor",
            Self::IntroText => "introText",
            Self::MarketTrendText => "marketTrendText",
            Self::ConclusionText => "conclusionText",
            Self::Properties => "properties",
            Self::PricesData => "pricesData",
            Self::DemandData => "demandData",
        }
    }
}

/// A replacement value for exactly one field.
///
/// Wire form: `{"field": "companyName", "value": "Acme"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldUpdate {
    CompanyName(String),
    ReportTitle(String),
    Subtitle(String),
    Date(String),
    AgentName(String),
    Website(String),
    HeroImage(String),
    LogoColor(String),
    IntroText(String),
    MarketTrendText(String),
    ConclusionText(String),
    Properties(Vec<Property>),
    PricesData(Vec<PricePoint>),
    DemandData(Vec<DemandSegment>),
}

impl FieldUpdate {
    pub fn field(&self) -> ReportField {
        match self {
            Self::CompanyName(_) => ReportField::CompanyName,
            Self::ReportTitle(_) => ReportField::ReportTitle,
            Self::Subtitle(_) => ReportField::Subtitle,
            Self::Date(_) => ReportField::Date,
            Self::AgentName(_) => ReportField::AgentName,
            Self::Website(_) => ReportField::Website,
            Self::HeroImage(_) => ReportField::HeroImage,
            Self::LogoColor(_) => ReportField::LogoColor,
            Self::IntroText(_) => ReportField::IntroText,
            Self::MarketTrendText(_) => ReportField::MarketTrendText,
            Self::ConclusionText(_) => ReportField::ConclusionText,
            Self::Properties(_) => ReportField::Properties,
            Self::PricesData(_) => ReportField::PricesData,
            Self::DemandData(_) => ReportField::DemandData,
        }
    }

    /// Replace the named field on `data`, leaving every other field as is.
    ///
    /// A property list with a repeated id is rejected and `data` is left
    /// unchanged.
    pub fn apply(self, data: &mut ReportData) -> Result<(), CoreError> {
        if let Self::Properties(list) = &self {
            let mut seen = HashSet::new();
            if let Some(dup) = list.iter().find(|p| !seen.insert(p.id.as_str())) {
                return Err(CoreError::DuplicatePropertyId(dup.id.clone()));
            }
        }
        match self {
            Self::CompanyName(v) => data.company_name = v,
            Self::ReportTitle(v) => data.report_title = v,
            Self::Subtitle(v) => data.subtitle = v,
            Self::Date(v) => data.date = v,
            Self::AgentName(v) => data.agent_name = v,
            Self::Website(v) => data.website = v,
            Self::HeroImage(v) => data.hero_image = v,
            Self::LogoColor(v) => data.logo_color = v,
            Self::IntroText(v) => data.intro_text = v,
            Self::MarketTrendText(v) => data.market_trend_text = v,
            Self::ConclusionText(v) => data.conclusion_text = v,
            Self::Properties(v) => data.properties = v,
            Self::PricesData(v) => data.prices_data = v,
            Self::DemandData(v) => data.demand_data = v,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_only_the_named_field() {
        let mut data = ReportData::default();
        let before = data.clone();

        FieldUpdate::CompanyName("Acme".to_string())
            .apply(&mut data)
            .unwrap();

        assert_eq!(data.company_name, "Acme");
        data.company_name = before.company_name.clone();
        assert_eq!(data, before);
    }

    #[test]
    fn property_list_with_repeated_id_is_rejected() {
        let mut data = ReportData::default();
        let before = data.clone();
        let mut list = data.properties.clone();
        list[1].id = list[0].id.clone();

        let result = FieldUpdate::Properties(list).apply(&mut data);

        assert!(matches!(result, Err(CoreError::DuplicatePropertyId(id)) if id == "1"));
        assert_eq!(data, before);
    }

    #[test]
    fn wire_form_is_field_and_value() {
        let update: FieldUpdate =
            serde_json::from_str(r#"{"field":"agentName","value":"J. Doe"}"#).unwrap();
        assert_eq!(update, FieldUpdate::AgentName("J. Doe".to_string()));
        assert_eq!(update.field().as_str(), "agentName");

        let json = serde_json::to_value(FieldUpdate::LogoColor("#000".to_string())).unwrap();
        assert_eq!(json["field"], "logoColor");
        assert_eq!(json["value"], "#000");
    }

    #[test]
    fn logo_fields_are_not_updatable() {
        let result =
            serde_json::from_str::<FieldUpdate>(r#"{"field":"logoImage","value":"data:x"}"#);
        assert!(result.is_err());
    }
}
