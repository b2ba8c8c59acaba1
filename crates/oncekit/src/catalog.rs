use crate::error::CatalogError;
use crate::schema::{Annotations, SequenceFile};
use crate::split::{Split, SplitLists};
use oncekit_3d::camera::{CameraCalibration, CameraName};
use oncekit_3d::pose::Pose;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Everything known about one frame of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// The vehicle pose, `None` when missing or not usable.
    pub pose: Option<Pose>,
    /// Calibration of every camera for this frame.
    pub calib: BTreeMap<CameraName, CameraCalibration>,
    /// Object annotations, only kept for annotated splits.
    pub annos: Option<Annotations>,
}

impl FrameRecord {
    /// The calibration of one camera.
    pub fn camera(&self, camera: CameraName) -> Option<&CameraCalibration> {
        self.calib.get(&camera)
    }
}

/// A loaded sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    id: String,
    split: Split,
    frame_list: Vec<String>,
    frames: HashMap<String, FrameRecord>,
}

impl Sequence {
    /// The sequence id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The split the sequence belongs to.
    pub fn split(&self) -> Split {
        self.split
    }

    /// The sorted, deduplicated frame ids.
    pub fn frame_list(&self) -> &[String] {
        &self.frame_list
    }

    /// Get the record of one frame.
    pub fn frame(&self, frame_id: &str) -> Option<&FrameRecord> {
        self.frames.get(frame_id)
    }

    /// Get the number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.frame_list.len()
    }

    /// Check if the sequence has no frames.
    pub fn is_empty(&self) -> bool {
        self.frame_list.is_empty()
    }
}

/// Read-only index of the sequences of the requested splits.
///
/// Built once from the dataset root, shared by reference afterwards.
#[derive(Debug, Clone)]
pub struct SequenceCatalog {
    root: PathBuf,
    split_lists: SplitLists,
    sequences: HashMap<Split, BTreeMap<String, Sequence>>,
}

impl SequenceCatalog {
    /// Build the catalog of the requested splits.
    ///
    /// Split membership is read from `<root>/ImageSets/<split>.txt` and the sequences from
    /// `<root>/data/<seq_id>/<seq_id>.json`. A sequence listed in a requested split is filed
    /// under the split it resolves to.
    ///
    /// # Arguments
    ///
    /// * `root` - The dataset root directory.
    /// * `splits` - The splits to load.
    ///
    /// # Errors
    ///
    /// If an annotation file is missing or malformed, or lacks a camera calibration.
    pub fn build(root: impl AsRef<Path>, splits: &[Split]) -> Result<Self, CatalogError> {
        let root = root.as_ref().to_path_buf();
        let split_lists = SplitLists::from_dir(root.join("ImageSets"))?;
        Self::build_with_lists(root, split_lists, splits)
    }

    /// Build the catalog from already parsed split lists.
    pub fn build_with_lists(
        root: impl AsRef<Path>,
        split_lists: SplitLists,
        splits: &[Split],
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            root: root.as_ref().to_path_buf(),
            split_lists,
            sequences: HashMap::new(),
        };

        for &split in splits {
            let ids = catalog.split_lists.sequences(split).to_vec();
            for seq_id in ids {
                let resolved = catalog.split_lists.resolve(&seq_id)?;
                let filed = catalog.sequences.entry(resolved).or_default();
                if filed.contains_key(&seq_id) {
                    continue;
                }
                if resolved != split {
                    log::debug!("sequence {seq_id} listed in {split} resolves to {resolved}");
                }
                let sequence = load_sequence(&catalog.root, &seq_id, resolved)?;
                filed.insert(seq_id, sequence);
            }
        }

        for split in Split::ALL {
            if let Some(filed) = catalog.sequences.get(&split) {
                log::info!(
                    "split {split}: {} sequences, {} frames",
                    filed.len(),
                    filed.values().map(Sequence::len).sum::<usize>()
                );
            }
        }

        Ok(catalog)
    }

    /// The dataset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The split membership lists.
    pub fn split_lists(&self) -> &SplitLists {
        &self.split_lists
    }

    /// The split a sequence belongs to, following the split priority order.
    pub fn find_split_name(&self, seq_id: &str) -> Result<Split, CatalogError> {
        self.split_lists.resolve(seq_id)
    }

    /// The ids of the loaded sequences of a split, sorted.
    pub fn sequence_ids(&self, split: Split) -> impl Iterator<Item = &str> {
        self.sequences
            .get(&split)
            .into_iter()
            .flat_map(|filed| filed.keys().map(String::as_str))
    }

    /// Get a loaded sequence.
    ///
    /// # Errors
    ///
    /// If the id is not listed in any split or its split was not loaded.
    pub fn sequence(&self, seq_id: &str) -> Result<&Sequence, CatalogError> {
        let split = self.find_split_name(seq_id)?;
        self.sequences
            .get(&split)
            .and_then(|filed| filed.get(seq_id))
            .ok_or_else(|| CatalogError::SequenceNotLoaded {
                seq_id: seq_id.to_string(),
                split,
            })
    }

    /// The sorted frame ids of a sequence.
    pub fn frame_list(&self, seq_id: &str) -> Result<&[String], CatalogError> {
        Ok(self.sequence(seq_id)?.frame_list())
    }

    /// Get the record of a frame.
    pub fn frame(&self, seq_id: &str, frame_id: &str) -> Result<&FrameRecord, CatalogError> {
        self.sequence(seq_id)?
            .frame(frame_id)
            .ok_or_else(|| CatalogError::FrameNotFound {
                seq_id: seq_id.to_string(),
                frame_id: frame_id.to_string(),
            })
    }

    /// The annotations of a frame, `None` when the frame or its split has none.
    pub fn frame_annotation(
        &self,
        seq_id: &str,
        frame_id: &str,
    ) -> Result<Option<&Annotations>, CatalogError> {
        Ok(self.frame(seq_id, frame_id)?.annos.as_ref())
    }

    /// The directory holding the files of a sequence.
    pub fn sequence_dir(&self, seq_id: &str) -> PathBuf {
        self.root.join("data").join(seq_id)
    }

    /// The path of the annotation file of a sequence.
    pub fn annotation_path(&self, seq_id: &str) -> PathBuf {
        annotation_path(&self.root, seq_id)
    }

    /// The path of the lidar sweep of a frame.
    pub fn lidar_path(&self, seq_id: &str, frame_id: &str) -> PathBuf {
        self.sequence_dir(seq_id)
            .join("lidar_roof")
            .join(format!("{frame_id}.bin"))
    }

    /// The path of the image of a camera for a frame.
    pub fn image_path(&self, seq_id: &str, frame_id: &str, camera: CameraName) -> PathBuf {
        self.sequence_dir(seq_id)
            .join(camera.as_str())
            .join(format!("{frame_id}.jpg"))
    }
}

fn annotation_path(root: &Path, seq_id: &str) -> PathBuf {
    root.join("data")
        .join(seq_id)
        .join(format!("{seq_id}.json"))
}

fn load_sequence(root: &Path, seq_id: &str, split: Split) -> Result<Sequence, CatalogError> {
    let path = annotation_path(root, seq_id);
    if !path.is_file() {
        return Err(CatalogError::MissingAnnotationFile {
            seq_id: seq_id.to_string(),
            path,
        });
    }

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) => {
            return Err(CatalogError::AnnotationFileError {
                seq_id: seq_id.to_string(),
                path,
                source,
            })
        }
    };
    let file: SequenceFile =
        serde_json::from_slice(&bytes).map_err(|source| CatalogError::InvalidAnnotationFile {
            seq_id: seq_id.to_string(),
            path,
            source,
        })?;

    let mut calib = BTreeMap::new();
    for camera in CameraName::ALL {
        let camera_calib = file.calib.get(camera.as_str()).ok_or_else(|| {
            CatalogError::MissingCalibration {
                seq_id: seq_id.to_string(),
                camera,
            }
        })?;
        calib.insert(camera, camera_calib.clone());
    }

    let mut frames = HashMap::with_capacity(file.frames.len());
    let mut dropped_annos = 0;
    for entry in file.frames {
        let frame_id = entry.frame_id.to_string();

        let pose = match entry.pose.as_deref().map(Pose::from_vector) {
            Some(Ok(pose)) => Some(pose),
            Some(Err(err)) => {
                log::warn!("sequence {seq_id} frame {frame_id}: unusable pose, {err}");
                None
            }
            None => None,
        };

        let annos = match entry.annos {
            Some(annos) if split.has_annotations() => Some(annos),
            Some(_) => {
                dropped_annos += 1;
                None
            }
            None => None,
        };

        // a repeated frame id keeps the last entry
        frames.insert(
            frame_id,
            FrameRecord {
                pose,
                calib: calib.clone(),
                annos,
            },
        );
    }

    if dropped_annos > 0 {
        log::debug!("sequence {seq_id}: ignored annotations of {dropped_annos} frames in {split}");
    }

    let mut frame_list: Vec<String> = frames.keys().cloned().collect();
    frame_list.sort();

    log::debug!(
        "loaded sequence {seq_id} of {split} with {} frames",
        frame_list.len()
    );

    Ok(Sequence {
        id: seq_id.to_string(),
        split,
        frame_list,
        frames,
    })
}
