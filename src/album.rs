use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

const ALBUM_FILE: &str = "album.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AlbumFile {
    title: Option<String>,
    desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub path: PathBuf,
    /// File name unless overridden.
    pub title: String,
    /// Contents of the `<stem>.desc` sidecar, if any.
    pub desc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Album {
    pub dir: PathBuf,
    pub title: String,
    pub desc: Option<String>,
    pub photos: Vec<Photo>,
}

impl Album {
    /// Reads the photos directly inside `dir`, sorted by file name.
    pub fn scan(dir: &Path) -> anyhow::Result<Self> {
        let info = read_album_file(dir)?;
        let rd = std::fs::read_dir(dir)
            .with_context(|| format!("reading album directory {}", dir.display()))?;

        let mut photos: Vec<Photo> = rd
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && !is_hidden(path))
            .filter(|path| crate::thumbnail::is_supported_image(path))
            .map(|path| {
                let title = path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .into_owned();
                let desc = read_desc(&path);
                Photo { path, title, desc }
            })
            .collect();
        photos.sort_by(|a, b| a.title.cmp(&b.title));

        let title = info.title.unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Album".to_string())
        });
        tracing::info!(dir = %dir.display(), photos = photos.len(), "scanned album");

        Ok(Self {
            dir: dir.to_path_buf(),
            title,
            desc: info.desc,
            photos,
        })
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }
}

fn read_album_file(dir: &Path) -> anyhow::Result<AlbumFile> {
    let path = dir.join(ALBUM_FILE);
    if !path.exists() {
        return Ok(AlbumFile::default());
    }
    let contents =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn read_desc(photo: &Path) -> Option<String> {
    let desc = std::fs::read_to_string(photo.with_extension("desc")).ok()?;
    let desc = desc.trim_end();
    (!desc.is_empty()).then(|| desc.to_string())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("collage-album-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn scan_sorts_photos_and_skips_other_files() {
        let dir = scratch_dir("sort");
        for name in ["b.jpg", "a.JPG", "c.png", ".hidden.jpg", "notes.txt", "a.desc"] {
            std::fs::write(dir.join(name), b"").expect("write file");
        }
        std::fs::create_dir_all(dir.join("sub.jpg")).expect("create subdir");

        let album = Album::scan(&dir).expect("scan");
        let titles: Vec<&str> = album.photos.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["a.JPG", "b.jpg", "c.png"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sidecar_description_is_trimmed() {
        let dir = scratch_dir("desc");
        std::fs::write(dir.join("p1.jpg"), b"").expect("write photo");
        std::fs::write(dir.join("p1.desc"), "Sunset over the bay\n\n").expect("write desc");
        std::fs::write(dir.join("p2.jpg"), b"").expect("write photo");

        let album = Album::scan(&dir).expect("scan");
        assert_eq!(album.photos[0].desc.as_deref(), Some("Sunset over the bay"));
        assert_eq!(album.photos[1].desc, None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn album_file_sets_title_and_description() {
        let dir = scratch_dir("meta");
        std::fs::write(dir.join("album.toml"), "title = \"Summer\"\ndesc = \"Road trip\"\n")
            .expect("write album file");

        let album = Album::scan(&dir).expect("scan");
        assert_eq!(album.title, "Summer");
        assert_eq!(album.desc.as_deref(), Some("Road trip"));
        assert_eq!(album.len(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn title_defaults_to_directory_name() {
        let dir = scratch_dir("untitled");
        let album = Album::scan(&dir).expect("scan");
        assert_eq!(album.title, dir.file_name().unwrap().to_string_lossy());
        assert_eq!(album.desc, None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("collage-album-does-not-exist-xyz");
        assert!(Album::scan(&dir).is_err());
    }
}
