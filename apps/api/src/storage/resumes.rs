//! Resume documents: upsert with a modified stamp, duplication, import, and
//! a five-snapshot version history per resume.

use anyhow::Result;
use uuid::Uuid;

use crate::models::resume::{Resume, ResumeData, ResumeVersion};
use crate::storage::JsonStore;

const RESUMES_FILE: &str = "resumes.json";

/// Oldest snapshots beyond this are dropped on each manual save.
const MAX_VERSIONS: usize = 5;

impl JsonStore {
    /// All resumes, newest first.
    pub fn list_resumes(&self) -> Vec<Resume> {
        self.read_list(RESUMES_FILE)
    }

    pub fn get_resume(&self, id: Uuid) -> Option<Resume> {
        self.list_resumes().into_iter().find(|r| r.id == id)
    }

    /// Upserts the document, stamping `last_modified`. New resumes go to the
    /// front of the list.
    pub fn save_resume(&self, mut resume: Resume) -> Result<Resume> {
        resume.last_modified = chrono::Utc::now().timestamp_millis();

        let mut resumes = self.list_resumes();
        match resumes.iter_mut().find(|r| r.id == resume.id) {
            Some(slot) => *slot = resume.clone(),
            None => resumes.insert(0, resume.clone()),
        }
        self.write_list(RESUMES_FILE, &resumes)?;
        Ok(resume)
    }

    pub fn delete_resume(&self, id: Uuid) -> Result<()> {
        let resumes: Vec<Resume> =
            self.list_resumes().into_iter().filter(|r| r.id != id).collect();
        self.write_list(RESUMES_FILE, &resumes)
    }

    /// Copies a resume under a fresh id with an empty version history.
    pub fn duplicate_resume(&self, id: Uuid) -> Result<Option<Resume>> {
        let Some(original) = self.get_resume(id) else {
            return Ok(None);
        };
        let duplicate = Resume {
            id: Uuid::new_v4(),
            name: format!("{} (Copy)", original.name),
            versions: Vec::new(),
            ..original
        };
        Ok(Some(self.save_resume(duplicate)?))
    }

    /// Prepends a snapshot of `data` to the resume's version history and
    /// enforces the snapshot cap.
    pub fn save_version(&self, resume_id: Uuid, data: ResumeData) -> Result<Option<Resume>> {
        let Some(mut resume) = self.get_resume(resume_id) else {
            return Ok(None);
        };

        resume.versions.insert(
            0,
            ResumeVersion {
                id: Uuid::new_v4(),
                timestamp: chrono::Utc::now().timestamp_millis(),
                data,
            },
        );
        resume.versions.truncate(MAX_VERSIONS);

        Ok(Some(self.save_resume(resume)?))
    }

    /// Returns a copy of a snapshot's document state. The caller decides
    /// whether to save it back as the current state.
    pub fn restore_version(&self, resume_id: Uuid, version_id: Uuid) -> Option<ResumeData> {
        self.get_resume(resume_id)?
            .versions
            .into_iter()
            .find(|v| v.id == version_id)
            .map(|v| v.data)
    }

    /// Stores an exported document under a fresh id.
    pub fn import_resume(&self, mut resume: Resume) -> Result<Resume> {
        resume.id = Uuid::new_v4();
        self.save_resume(resume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_stamps_last_modified() {
        let (_dir, store) = make_store();
        let mut resume = Resume::new("Test");
        resume.last_modified = 0;
        let saved = store.save_resume(resume).unwrap();
        assert!(saved.last_modified > 0);
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let (_dir, store) = make_store();
        let resume = store.save_resume(Resume::new("Original")).unwrap();

        let mut updated = resume.clone();
        updated.name = "Renamed".to_string();
        store.save_resume(updated).unwrap();

        let resumes = store.list_resumes();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].name, "Renamed");
    }

    #[test]
    fn test_new_resumes_listed_first() {
        let (_dir, store) = make_store();
        let first = store.save_resume(Resume::new("First")).unwrap();
        let second = store.save_resume(Resume::new("Second")).unwrap();

        let resumes = store.list_resumes();
        assert_eq!(resumes[0].id, second.id);
        assert_eq!(resumes[1].id, first.id);
    }

    #[test]
    fn test_delete_resume() {
        let (_dir, store) = make_store();
        let resume = store.save_resume(Resume::new("Doomed")).unwrap();
        store.delete_resume(resume.id).unwrap();
        assert!(store.get_resume(resume.id).is_none());
    }

    #[test]
    fn test_duplicate_gets_fresh_id_and_copy_suffix() {
        let (_dir, store) = make_store();
        let mut original = Resume::new("Mine");
        original.versions.push(ResumeVersion {
            id: Uuid::new_v4(),
            timestamp: 1,
            data: ResumeData::default(),
        });
        let original = store.save_resume(original).unwrap();

        let duplicate = store.duplicate_resume(original.id).unwrap().unwrap();
        assert_ne!(duplicate.id, original.id);
        assert_eq!(duplicate.name, "Mine (Copy)");
        assert!(duplicate.versions.is_empty());
    }

    #[test]
    fn test_duplicate_missing_resume_is_none() {
        let (_dir, store) = make_store();
        assert!(store.duplicate_resume(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_version_history_capped_at_five() {
        let (_dir, store) = make_store();
        let resume = store.save_resume(Resume::new("Versioned")).unwrap();

        for i in 0..7 {
            let mut data = ResumeData::default();
            data.personal.full_name = format!("Name {i}");
            store.save_version(resume.id, data).unwrap();
        }

        let resume = store.get_resume(resume.id).unwrap();
        assert_eq!(resume.versions.len(), MAX_VERSIONS);
        // newest snapshot first
        assert_eq!(resume.versions[0].data.personal.full_name, "Name 6");
        assert_eq!(resume.versions[4].data.personal.full_name, "Name 2");
    }

    #[test]
    fn test_restore_version_returns_snapshot() {
        let (_dir, store) = make_store();
        let resume = store.save_resume(Resume::new("Versioned")).unwrap();

        let mut data = ResumeData::default();
        data.personal.full_name = "Snapshot".to_string();
        let saved = store.save_version(resume.id, data).unwrap().unwrap();
        let version_id = saved.versions[0].id;

        let restored = store.restore_version(resume.id, version_id).unwrap();
        assert_eq!(restored.personal.full_name, "Snapshot");
    }

    #[test]
    fn test_restore_missing_version_is_none() {
        let (_dir, store) = make_store();
        let resume = store.save_resume(Resume::new("Versioned")).unwrap();
        assert!(store.restore_version(resume.id, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_import_assigns_fresh_id() {
        let (_dir, store) = make_store();
        let exported = Resume::new("Exported");
        let original_id = exported.id;
        let imported = store.import_resume(exported).unwrap();
        assert_ne!(imported.id, original_id);
        assert!(store.get_resume(imported.id).is_some());
    }
}
