//! Photo records and their editable details.

use super::filter::FilterSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored photo as the gateway returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Server-assigned identifier.
    pub id: u64,
    /// Public URL of the stored object.
    pub url: String,
    /// Key of the stored object, needed to remove it.
    pub object_key: String,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    /// Filter settings in effect when the photo was uploaded.
    pub filter_settings: FilterSettings,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub date_taken: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shutter_speed: Option<String>,
    #[serde(default)]
    pub aperture: Option<String>,
    #[serde(default)]
    pub iso: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PhotoRecord {
    pub fn layout(&self) -> LayoutClass {
        LayoutClass::for_aspect(self.aspect_ratio)
    }

    /// Current editable details.
    pub fn details(&self) -> PhotoDetails {
        PhotoDetails {
            caption: self.caption.clone(),
            date_taken: self.date_taken,
            shutter_speed: self.shutter_speed.clone(),
            aperture: self.aperture.clone(),
            iso: self.iso.clone(),
        }
    }

    pub(crate) fn apply(&mut self, details: PhotoDetails) {
        self.caption = details.caption;
        self.date_taken = details.date_taken;
        self.shutter_speed = details.shutter_speed;
        self.aperture = details.aperture;
        self.iso = details.iso;
    }

    /// Name of the file in the object store (last URL segment).
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// Insert payload for a freshly uploaded photo.
///
/// Caption and exposure fields start empty; users fill them in afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPhoto {
    pub url: String,
    pub object_key: String,
    pub width: u32,
    pub height: u32,
    pub filter_settings: FilterSettings,
}

impl NewPhoto {
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

/// Editable per-photo metadata.
///
/// Exposure values are free text ("1/250", "f/2.8", "400") and are not
/// parsed or validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoDetails {
    pub caption: Option<String>,
    pub date_taken: Option<DateTime<Utc>>,
    pub shutter_speed: Option<String>,
    pub aperture: Option<String>,
    pub iso: Option<String>,
}

impl PhotoDetails {
    /// Build details from raw form input: values are trimmed and empty
    /// strings become absent.
    pub fn from_input(
        caption: Option<&str>,
        date_taken: Option<DateTime<Utc>>,
        shutter_speed: Option<&str>,
        aperture: Option<&str>,
        iso: Option<&str>,
    ) -> Self {
        Self {
            caption: normalize(caption),
            date_taken,
            shutter_speed: normalize(shutter_speed),
            aperture: normalize(aperture),
            iso: normalize(iso),
        }
    }

    /// Re-normalize every text field.
    pub fn normalized(self) -> Self {
        Self {
            caption: normalize(self.caption.as_deref()),
            date_taken: self.date_taken,
            shutter_speed: normalize(self.shutter_speed.as_deref()),
            aperture: normalize(self.aperture.as_deref()),
            iso: normalize(self.iso.as_deref()),
        }
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Grid cell shape derived from aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutClass {
    /// Spans two columns.
    Wide,
    /// Spans two rows.
    Tall,
    Regular,
}

impl LayoutClass {
    pub fn for_aspect(aspect_ratio: f64) -> Self {
        if aspect_ratio > 1.5 {
            Self::Wide
        } else if aspect_ratio < 0.7 {
            Self::Tall
        } else {
            Self::Regular
        }
    }

    /// CSS class name; empty for regular cells.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Wide => "wide",
            Self::Tall => "tall",
            Self::Regular => "",
        }
    }
}
