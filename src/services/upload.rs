use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["gif", "png", "jpg", "jpeg"];

/// How long the file-type warning stays on screen.
pub const UPLOAD_ERROR_DISMISS: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Please upload valid file type (jpg, jpeg, png or gif)")]
    InvalidFileType { file_name: String },

    #[error("unknown upload slot: {0}")]
    UnknownSlot(Uuid),
}

impl UploadError {
    /// Interval after which the UI clears the message, if it is transient.
    pub fn dismiss_after(&self) -> Option<Duration> {
        match self {
            UploadError::InvalidFileType { .. } => Some(UPLOAD_ERROR_DISMISS),
            UploadError::UnknownSlot(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSlot {
    pub id: Uuid,
    pub image: Option<String>,
}

impl UploadSlot {
    fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            image: None,
        }
    }
}

/// Ordered image slots with stable ids. Positions come from the list order;
/// ids are never renumbered.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSlots {
    slots: Vec<UploadSlot>,
}

impl Default for UploadSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSlots {
    /// A single empty slot.
    pub fn new() -> Self {
        Self {
            slots: vec![UploadSlot::empty()],
        }
    }

    /// One slot per existing image, followed by an empty slot for the next
    /// upload.
    pub fn with_images<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<UploadSlot> = images
            .into_iter()
            .map(|url| UploadSlot {
                id: Uuid::new_v4(),
                image: Some(url.into()),
            })
            .collect();
        slots.push(UploadSlot::empty());
        Self { slots }
    }

    pub fn slots(&self) -> &[UploadSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    /// Images in display order, skipping empty slots.
    pub fn images(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter_map(|s| s.image.as_deref())
            .collect()
    }

    /// Stores an image in a slot. Filling the last slot opens a new empty one
    /// after it.
    pub fn fill(&mut self, id: Uuid, file_name: &str, url: &str) -> Result<(), UploadError> {
        check_file_type(file_name)?;
        let index = self.position(id).ok_or(UploadError::UnknownSlot(id))?;
        self.slots[index].image = Some(url.to_string());
        if index + 1 == self.slots.len() {
            self.slots.push(UploadSlot::empty());
        }
        Ok(())
    }

    pub fn apply_crop(&mut self, cropped: CroppedImage) -> Result<(), UploadError> {
        let index = self
            .position(cropped.slot)
            .ok_or(UploadError::UnknownSlot(cropped.slot))?;
        self.slots[index].image = Some(cropped.data_url);
        Ok(())
    }

    /// Removes a slot, keeping the order of the rest. The only remaining slot
    /// is cleared instead.
    pub fn remove(&mut self, id: Uuid) -> Result<(), UploadError> {
        let index = self.position(id).ok_or(UploadError::UnknownSlot(id))?;
        if self.slots.len() == 1 {
            self.slots[0].image = None;
        } else {
            self.slots.remove(index);
        }
        Ok(())
    }

    /// Moves a slot to a new position, as a drag in the sortable list does.
    pub fn move_to(&mut self, id: Uuid, to: usize) -> Result<(), UploadError> {
        let from = self.position(id).ok_or(UploadError::UnknownSlot(id))?;
        let slot = self.slots.remove(from);
        let to = to.min(self.slots.len());
        self.slots.insert(to, slot);
        Ok(())
    }
}

pub fn check_file_type(file_name: &str) -> Result<(), UploadError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(UploadError::InvalidFileType {
            file_name: file_name.to_string(),
        })
    }
}

/// Output size of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropTarget {
    pub width: u32,
    pub height: u32,
}

impl CropTarget {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropSession {
    pub slot: Uuid,
    pub target: CropTarget,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage {
    pub slot: Uuid,
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CropperError {
    #[error("cropper is in use by slot {0}")]
    Busy(Uuid),

    #[error("no crop in progress")]
    Idle,
}

/// The one cropper a page can show. Whoever opens a session owns it until it
/// is cropped or released.
#[derive(Debug, Default)]
pub struct Cropper {
    active: Option<CropSession>,
}

impl Cropper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&CropSession> {
        self.active.as_ref()
    }

    pub fn acquire(
        &mut self,
        slot: Uuid,
        source: &str,
        target: CropTarget,
    ) -> Result<&CropSession, CropperError> {
        if let Some(current) = &self.active {
            return Err(CropperError::Busy(current.slot));
        }
        Ok(self.active.insert(CropSession {
            slot,
            target,
            source: source.to_string(),
        }))
    }

    pub fn release(&mut self) -> Option<CropSession> {
        let released = self.active.take();
        if let Some(session) = &released {
            tracing::debug!(slot = %session.slot, "crop session released");
        }
        released
    }

    /// Releases whatever session is open and starts a new one; returns the
    /// displaced session.
    pub fn replace(
        &mut self,
        slot: Uuid,
        source: &str,
        target: CropTarget,
    ) -> Option<CropSession> {
        let displaced = self.release();
        self.active = Some(CropSession {
            slot,
            target,
            source: source.to_string(),
        });
        displaced
    }

    /// Finishes the open session. The encoded image comes from the rendering
    /// side; the session is consumed either way.
    pub fn crop(&mut self, data_url: &str) -> Result<CroppedImage, CropperError> {
        let session = self.active.take().ok_or(CropperError::Idle)?;
        Ok(CroppedImage {
            slot: session.slot,
            width: session.target.width,
            height: session.target.height,
            data_url: data_url.to_string(),
        })
    }
}
