use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// The full content record backing one market report.
///
/// Serialized with camelCase keys so that records written by earlier
/// browser-only builds of the editor load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub company_name: String,
    pub report_title: String,
    pub subtitle: String,
    pub date: String,
    pub agent_name: String,
    pub website: String,
    #[serde(default)]
    pub hero_image: String,
    /// Brand color as a CSS color string, e.g. `#8EB8B5`.
    pub logo_color: String,
    /// Primary logo. Always a member of `saved_logos` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_image: Option<String>,
    /// Subset of `saved_logos`, in the order they were toggled on.
    #[serde(default)]
    pub secondary_logos: Vec<String>,
    /// Logo library, oldest first.
    #[serde(default)]
    pub saved_logos: Vec<String>,
    pub intro_text: String,
    pub market_trend_text: String,
    pub conclusion_text: String,
    pub properties: Vec<Property>,
    pub prices_data: Vec<PricePoint>,
    pub demand_data: Vec<DemandSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub address: String,
    /// Display string, e.g. `$200,000`. Never parsed.
    pub price: String,
    pub features: Vec<String>,
    pub image: String,
}

/// One bar of the price-trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "year")]
    pub label: String,
    pub price: f64,
}

/// One segment of the demand ring chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSegment {
    #[serde(rename = "name")]
    pub label: String,
    pub value: f64,
}

impl Property {
    /// A blank listing with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            address: String::new(),
            price: String::new(),
            features: Vec::new(),
            image: String::new(),
        }
    }
}

impl ReportData {
    /// Add a logo to the library (if not already present) and make it primary.
    pub fn add_logo(&mut self, logo: String) {
        if !self.saved_logos.contains(&logo) {
            self.saved_logos.push(logo.clone());
        }
        self.logo_image = Some(logo);
    }

    /// Remove a logo from the library and the secondary list.
    ///
    /// If it was the primary logo, the most recently added remaining logo is
    /// promoted, or the primary is cleared when the library is empty.
    pub fn remove_logo(&mut self, logo: &str) {
        self.saved_logos.retain(|l| l != logo);
        self.secondary_logos.retain(|l| l != logo);

        if self.logo_image.as_deref() == Some(logo) {
            self.logo_image = self.saved_logos.last().cloned();
        }
    }

    /// Flip secondary membership of a saved logo. Primary status is untouched.
    pub fn toggle_secondary(&mut self, logo: &str) -> Result<(), CoreError> {
        if let Some(pos) = self.secondary_logos.iter().position(|l| l == logo) {
            self.secondary_logos.remove(pos);
            return Ok(());
        }
        if !self.saved_logos.iter().any(|l| l == logo) {
            return Err(CoreError::LogoNotSaved);
        }
        self.secondary_logos.push(logo.to_string());
        Ok(())
    }

    /// Make an already-saved logo the primary one.
    pub fn select_primary(&mut self, logo: &str) -> Result<(), CoreError> {
        if !self.saved_logos.iter().any(|l| l == logo) {
            return Err(CoreError::LogoNotSaved);
        }
        self.logo_image = Some(logo.to_string());
        Ok(())
    }

    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Replace the listing with the same id.
    pub fn update_property(&mut self, property: Property) -> Result<(), CoreError> {
        let slot = self
            .properties
            .iter_mut()
            .find(|p| p.id == property.id)
            .ok_or_else(|| CoreError::PropertyNotFound(property.id.clone()))?;
        *slot = property;
        Ok(())
    }

    pub fn remove_property(&mut self, id: &str) -> Result<Property, CoreError> {
        let pos = self
            .properties
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::PropertyNotFound(id.to_string()))?;
        Ok(self.properties.remove(pos))
    }
}

impl Default for ReportData {
    fn default() -> Self {
        Self {
            company_name: "Rimberio y asociados".to_string(),
            report_title: "REAL ESTATE REPORT".to_string(),
            subtitle: "REAL ESTATE".to_string(),
            date: "July 2023".to_string(),
            agent_name: "Sandra haro".to_string(),
            website: "www.sitioincreible.com".to_string(),
            hero_image: "https://picsum.photos/1200/800".to_string(),
            logo_color: "#8EB8B5".to_string(),
            logo_image: None,
            secondary_logos: Vec::new(),
            saved_logos: Vec::new(),
            intro_text: "The real estate market of Alta Pinta City has changed \
                significantly in recent years. Property values have risen steadily \
                because of growing demand and scarce supply. This report analyses the \
                current state of the market, including prices, supply and demand, and \
                market trends."
                .to_string(),
            market_trend_text: "Higher demand for new properties: buyers are looking \
                for new, modern homes, which has driven a rise in the construction of \
                new apartment buildings."
                .to_string(),
            conclusion_text: "Overall, the Alta Pinta City market remains strong due to \
                high demand and limited supply. Prices have risen steadily over the last \
                years and are expected to keep rising. Buyers are looking for new and \
                modern homes, and foreign investment in the city remains high."
                .to_string(),
            properties: vec![
                sample_property(
                    "1",
                    "Property 1",
                    "$200,000",
                    &[
                        "3 bedrooms and 2 full bathrooms",
                        "Living room with a large window",
                        "Fitted kitchen",
                        "120 m2 of living space",
                    ],
                ),
                sample_property(
                    "2",
                    "Property 2",
                    "$500,000",
                    &[
                        "Located in a residential neighbourhood",
                        "4 bedrooms and 3 bathrooms",
                        "Garden with pool",
                        "Garage for 2 cars",
                    ],
                ),
                sample_property(
                    "3",
                    "Property 3",
                    "$300,000",
                    &[
                        "1 bedroom and 1 bathroom",
                        "High ceilings",
                        "Modern kitchen",
                        "Building with gym",
                    ],
                ),
            ],
            prices_data: (1..=5)
                .map(|i| PricePoint {
                    label: format!("Year {i}"),
                    price: f64::from(i * 10),
                })
                .collect(),
            demand_data: (1..=5)
                .map(|i| DemandSegment {
                    label: format!("District {i}"),
                    value: 20.0,
                })
                .collect(),
        }
    }
}

fn sample_property(id: &str, title: &str, price: &str, features: &[&str]) -> Property {
    Property {
        id: id.to_string(),
        title: title.to_string(),
        address: "Any Street 123, Anywhere.".to_string(),
        price: price.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
        image: format!("https://picsum.photos/400/300?random={id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_logos(logos: &[&str]) -> ReportData {
        let mut data = ReportData::default();
        for logo in logos {
            data.add_logo(logo.to_string());
        }
        data
    }

    #[test]
    fn add_logo_sets_primary_without_duplicating() {
        let mut data = with_logos(&["a", "b"]);
        data.add_logo("a".to_string());

        assert_eq!(data.saved_logos, vec!["a", "b"]);
        assert_eq!(data.logo_image.as_deref(), Some("a"));
    }

    #[test]
    fn removing_primary_promotes_most_recent_remaining() {
        let mut data = with_logos(&["a", "b", "c"]);
        data.select_primary("a").unwrap();

        data.remove_logo("a");

        assert_eq!(data.saved_logos, vec!["b", "c"]);
        assert_eq!(data.logo_image.as_deref(), Some("c"));
    }

    #[test]
    fn removing_only_logo_clears_primary() {
        let mut data = with_logos(&["a"]);
        data.toggle_secondary("a").unwrap();

        data.remove_logo("a");

        assert!(data.saved_logos.is_empty());
        assert!(data.secondary_logos.is_empty());
        assert_eq!(data.logo_image, None);
    }

    #[test]
    fn removing_non_primary_keeps_primary() {
        let mut data = with_logos(&["a", "b"]);
        data.remove_logo("a");
        assert_eq!(data.logo_image.as_deref(), Some("b"));
    }

    #[test]
    fn toggle_secondary_twice_restores_membership() {
        let mut data = with_logos(&["a", "b"]);
        data.toggle_secondary("b").unwrap();
        let before = data.secondary_logos.clone();

        data.toggle_secondary("a").unwrap();
        data.toggle_secondary("a").unwrap();

        assert_eq!(data.secondary_logos, before);
        assert_eq!(data.logo_image.as_deref(), Some("b"));
    }

    #[test]
    fn select_primary_rejects_unsaved_logo() {
        let mut data = with_logos(&["a"]);
        assert!(matches!(
            data.select_primary("zzz"),
            Err(CoreError::LogoNotSaved)
        ));
        assert_eq!(data.logo_image.as_deref(), Some("a"));
    }

    #[test]
    fn toggle_secondary_rejects_unsaved_logo() {
        let mut data = with_logos(&["a"]);
        assert!(matches!(
            data.toggle_secondary("https://elsewhere.example/x.png"),
            Err(CoreError::LogoNotSaved)
        ));
        assert!(data.secondary_logos.is_empty());
        assert_eq!(data.saved_logos, vec!["a"]);
    }

    #[test]
    fn property_mutations_by_id() {
        let mut data = ReportData::default();
        let mut extra = Property::new("Loft");
        let id = extra.id.clone();
        data.add_property(extra.clone());

        extra.price = "$1".to_string();
        data.update_property(extra).unwrap();
        assert_eq!(data.properties.last().unwrap().price, "$1");

        let removed = data.remove_property(&id).unwrap();
        assert_eq!(removed.title, "Loft");
        assert!(data.remove_property(&id).is_err());
    }

    #[test]
    fn serializes_with_legacy_keys() {
        let value = serde_json::to_value(ReportData::default()).unwrap();
        assert!(value.get("companyName").is_some());
        assert!(value.get("logoImage").is_none());
        assert_eq!(value["pricesData"][0]["year"], "Year 1");
        assert_eq!(value["demandData"][0]["name"], "District 1");
    }

    #[test]
    fn missing_logo_lists_default_to_empty() {
        let mut value = serde_json::to_value(ReportData::default()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("savedLogos");
        obj.remove("secondaryLogos");

        let data: ReportData = serde_json::from_value(value).unwrap();
        assert!(data.saved_logos.is_empty());
        assert!(data.secondary_logos.is_empty());
    }
}
