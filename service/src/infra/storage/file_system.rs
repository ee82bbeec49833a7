//! [`FileSystem`] [`Storage`] implementation.

use std::{io, path::PathBuf, sync::Arc};

use common::operations::{By, Delete, Insert};
use tokio::fs;
use tracerr::Traced;

use crate::domain::{
    document::{Bucket, Key, PublicUrl},
    Document,
};

use super::{Error, Storage};

/// [`Storage`] keeping every [`Bucket`] as a directory on the local file
/// system.
#[derive(Clone, Debug)]
pub struct FileSystem {
    /// Directory containing the [`Bucket`] directories.
    root: Arc<PathBuf>,

    /// Base URL the root directory is publicly served from.
    public_url: Arc<str>,
}

impl FileSystem {
    /// Creates a new [`FileSystem`] storage rooted at the provided directory
    /// and served from the provided `public_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: Arc::new(root.into()),
            public_url: public_url.into(),
        }
    }

    /// Returns the file path of the object stored under the provided [`Key`]
    /// in the provided [`Bucket`].
    fn path_of(&self, bucket: Bucket, key: &Key) -> PathBuf {
        let (bucket, key): (&str, &str) = (bucket.as_ref(), key.as_ref());
        self.root.join(bucket).join(key)
    }
}

impl Storage<Insert<Document>> for FileSystem {
    type Ok = PublicUrl;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(doc): Insert<Document>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = doc.key();
        let path = self.path_of(Document::BUCKET, &key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(tracerr::from_and_wrap!(=> Error))?;
        }

        // Readers never observe a partially written object.
        let partial = path.with_extension("part");
        fs::write(&partial, &doc.bytes)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        fs::rename(&partial, &path)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        Ok(PublicUrl::new(&self.public_url, Document::BUCKET, &key))
    }
}

impl Storage<Delete<By<Document, Key>>> for FileSystem {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Document, Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        match fs::remove_file(self.path_of(Document::BUCKET, &key)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(tracerr::new!(Error::from(e)))
            }
            Ok(()) | Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert};
    use uuid::Uuid;

    use crate::{
        domain::{
            document::{ContentType, Kind},
            user, Document,
        },
        infra::Storage as _,
    };

    use super::FileSystem;

    #[tokio::test]
    async fn upserts_and_deletes_objects() {
        let root = std::env::temp_dir().join(Uuid::new_v4().to_string());
        let storage = FileSystem::new(&root, "http://localhost/storage");
        let doc = |bytes: &[u8]| Document {
            kind: Kind::ProfilePhoto,
            owner: user::Id::from(Uuid::nil()),
            content_type: ContentType::Png,
            bytes: bytes.to_vec(),
        };

        let url = storage.execute(Insert(doc(b"first"))).await.unwrap();
        assert_eq!(
            url.to_string(),
            "http://localhost/storage/instructor-documents/\
             00000000-0000-0000-0000-000000000000/profile-photo.png",
        );
        drop(storage.execute(Insert(doc(b"second"))).await.unwrap());

        let key = doc(b"").key();
        let path = root
            .join("instructor-documents")
            .join(AsRef::<str>::as_ref(&key));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");

        storage
            .execute(Delete(By::new(doc(b"").key())))
            .await
            .unwrap();
        assert!(!path.exists());

        storage
            .execute(Delete(By::new(doc(b"").key())))
            .await
            .unwrap();

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
