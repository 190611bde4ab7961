//! The single-writer report store.
//!
//! Holds the in-memory [`ReportData`] and [`ReportTemplate`] and writes the
//! whole record back after every mutation. Persistence failures are logged
//! and never surfaced: the editor keeps working from memory.

use tracing::{error, info, warn};

use folio_core::error::CoreError;
use folio_core::keys;
use folio_core::models::field::FieldUpdate;
use folio_core::models::image::InlineImage;
use folio_core::models::report::{Property, ReportData};
use folio_core::models::template::ReportTemplate;

use crate::backend::LocalStorage;
use crate::error::StorageError;

pub struct ReportStore {
    backend: Box<dyn LocalStorage>,
    data: ReportData,
    template: ReportTemplate,
}

/// Load the persisted report, or the default record if it is absent,
/// unreadable, or corrupt.
pub fn load(backend: &dyn LocalStorage) -> ReportData {
    match backend.get(keys::REPORT_DATA) {
        Ok(Some(json)) => match serde_json::from_str::<ReportData>(&json) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "stored report is corrupt, using default");
                ReportData::default()
            }
        },
        Ok(None) => {
            info!("no stored report, using default");
            ReportData::default()
        }
        Err(e) => {
            warn!(error = %e, "failed to read stored report, using default");
            ReportData::default()
        }
    }
}

/// Serialize and write the full record.
pub fn save(backend: &dyn LocalStorage, data: &ReportData) -> Result<(), StorageError> {
    let json = serde_json::to_string(data)?;
    backend.set(keys::REPORT_DATA, &json)
}

/// Load the persisted template selector, falling back to classic.
pub fn load_template(backend: &dyn LocalStorage) -> ReportTemplate {
    match backend.get(keys::REPORT_TEMPLATE) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: CoreError| {
            warn!(error = %e, "stored template is invalid, using default");
            ReportTemplate::default()
        }),
        Ok(None) => ReportTemplate::default(),
        Err(e) => {
            warn!(error = %e, "failed to read stored template, using default");
            ReportTemplate::default()
        }
    }
}

pub fn save_template(
    backend: &dyn LocalStorage,
    template: ReportTemplate,
) -> Result<(), StorageError> {
    backend.set(keys::REPORT_TEMPLATE, template.as_str())
}

impl ReportStore {
    /// Open the store, reading both persisted entries.
    pub fn open(backend: impl LocalStorage + 'static) -> Self {
        let backend: Box<dyn LocalStorage> = Box::new(backend);
        let data = load(backend.as_ref());
        let template = load_template(backend.as_ref());
        info!(
            template = %template,
            properties = data.properties.len(),
            saved_logos = data.saved_logos.len(),
            "report store opened"
        );
        Self {
            backend,
            data,
            template,
        }
    }

    pub fn data(&self) -> &ReportData {
        &self.data
    }

    pub fn template(&self) -> ReportTemplate {
        self.template
    }

    /// Write the current record. Errors are returned to the caller; the
    /// mutation methods log them instead.
    pub fn save(&self) -> Result<(), StorageError> {
        save(self.backend.as_ref(), &self.data)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            error!(error = %e, "failed to persist report");
        }
    }

    /// Replace one field.
    pub fn update(&mut self, update: FieldUpdate) -> Result<(), StorageError> {
        let field = update.field();
        update.apply(&mut self.data)?;
        tracing::debug!(field = field.as_str(), "report field updated");
        self.persist();
        Ok(())
    }

    /// Replace the whole record.
    pub fn replace(&mut self, data: ReportData) {
        self.data = data;
        self.persist();
    }

    /// Save a logo to the library and make it primary. Returns the stored
    /// reference.
    pub fn add_logo(&mut self, image: &InlineImage) -> String {
        let logo = image.to_data_uri();
        self.data.add_logo(logo.clone());
        info!(saved_logos = self.data.saved_logos.len(), "logo added");
        self.persist();
        logo
    }

    pub fn remove_logo(&mut self, logo: &str) {
        self.data.remove_logo(logo);
        info!(
            saved_logos = self.data.saved_logos.len(),
            has_primary = self.data.logo_image.is_some(),
            "logo removed"
        );
        self.persist();
    }

    pub fn toggle_secondary(&mut self, logo: &str) -> Result<(), StorageError> {
        self.data.toggle_secondary(logo)?;
        self.persist();
        Ok(())
    }

    pub fn select_primary(&mut self, logo: &str) -> Result<(), StorageError> {
        self.data.select_primary(logo)?;
        self.persist();
        Ok(())
    }

    pub fn add_property(&mut self, property: Property) {
        self.data.add_property(property);
        self.persist();
    }

    pub fn update_property(&mut self, property: Property) -> Result<(), StorageError> {
        self.data.update_property(property)?;
        self.persist();
        Ok(())
    }

    pub fn remove_property(&mut self, id: &str) -> Result<Property, StorageError> {
        let removed = self.data.remove_property(id)?;
        self.persist();
        Ok(removed)
    }

    pub fn set_template(&mut self, template: ReportTemplate) {
        self.template = template;
        if let Err(e) = save_template(self.backend.as_ref(), template) {
            error!(error = %e, "failed to persist template");
        }
        info!(template = %template, "template selected");
    }
}
