use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use eyre::eyre;
use rand::Rng;
use walkdir::WalkDir;

use crate::err;
use crate::utils::constants::{GUID_LEN, GUID_REFERENCE_EXTENSIONS};

/// Fresh 32 hex char guid.
pub fn new_guid() -> String {
    let mut rng = rand::thread_rng();

    (0..GUID_LEN)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap())
        .collect()
}

/// Pulls the `guid:` value out of a .meta file's text.
pub fn meta_guid(text: &str) -> Option<&str> {
    text.lines()
        .find_map(|line| line.trim().strip_prefix("guid:"))
        .map(str::trim)
        .filter(|guid| guid.len() == GUID_LEN)
}

/// Every file under `root` with one of the reference extensions whose text
/// holds the literal `guid: <hex>` token. Unreadable files are not text
/// assets and are skipped.
pub fn find_references_in(
    root: &Path,
    guid: &str,
    extensions: &[String],
) -> eyre::Result<Vec<PathBuf>> {
    let token = format!("guid: {}", guid);
    let mut references = vec![];

    for entry in WalkDir::new(root).into_iter().filter_map(|res| res.ok()) {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let qualified = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|qualified| qualified == ext))
            .unwrap_or(false);

        if !qualified {
            continue;
        }

        let Ok(text) = fs::read_to_string(path) else {
            continue;
        };

        if text.contains(&token) {
            references.push(path.to_path_buf());
        }
    }

    references.sort();

    Ok(references)
}

fn replace_in_file(path: &Path, from: &str, to: &str) -> eyre::Result<()> {
    let text = fs::read_to_string(path)
        .map_err(|err| eyre!("Cannot read {}: {}", path.display(), err))?;

    if !text.contains(from) {
        return Ok(());
    }

    fs::write(path, text.replace(from, to))
        .map_err(|err| eyre!("Cannot write {}: {}", path.display(), err))?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct GuidEntry {
    pub asset_path: PathBuf,
    /// None until a reference search ran for this guid.
    pub references: Option<Vec<PathBuf>>,
}

impl GuidEntry {
    fn meta_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.meta", self.asset_path.display()))
    }
}

/// Scans a folder's .meta sidecars once, then finds references to each guid
/// and rewrites them with freshly generated ones on request.
pub struct GuidOps {
    root: PathBuf,
    search_root: Option<PathBuf>,
    extensions: Vec<String>,
    entries: HashMap<String, GuidEntry>,
}

impl GuidOps {
    pub fn scan(root: impl AsRef<Path> + Into<PathBuf>) -> eyre::Result<Self> {
        if !root.as_ref().is_dir() {
            return err!("{} is not a folder", root.as_ref().display());
        }

        let mut entries = HashMap::new();

        for entry in WalkDir::new(root.as_ref())
            .into_iter()
            .filter_map(|res| res.ok())
        {
            let path = entry.path();

            if !path.is_file() || path.extension().map(|ext| ext != "meta").unwrap_or(true) {
                continue;
            }

            let Ok(text) = fs::read_to_string(path) else {
                continue;
            };

            let Some(guid) = meta_guid(&text) else {
                continue;
            };

            entries.insert(
                guid.to_string(),
                GuidEntry {
                    // with_extension strips the trailing .meta
                    asset_path: path.with_extension(""),
                    references: None,
                },
            );
        }

        Ok(Self {
            root: root.into(),
            search_root: None,
            extensions: GUID_REFERENCE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            entries,
        })
    }

    fn log(&self, s: impl AsRef<str>) {
        println!("{}", s.as_ref());
    }

    pub fn entries(&self) -> &HashMap<String, GuidEntry> {
        &self.entries
    }

    /// Widens the reference search beyond the scanned folder.
    pub fn search_root(&mut self, a: impl Into<PathBuf>) -> &mut Self {
        self.search_root = Some(a.into());
        self
    }

    pub fn extensions(&mut self, a: &[String]) -> &mut Self {
        self.extensions = a.to_vec();
        self
    }

    fn reference_search_root(&self) -> &Path {
        self.search_root.as_deref().unwrap_or(&self.root)
    }

    pub fn find_references(&mut self, guid: &str) -> eyre::Result<usize> {
        if !self.entries.contains_key(guid) {
            return err!("Unknown guid {}", guid);
        }

        let references = find_references_in(self.reference_search_root(), guid, &self.extensions)?;
        let count = references.len();

        // checked right above
        self.entries.get_mut(guid).unwrap().references = Some(references);

        Ok(count)
    }

    pub fn find_all_references(&mut self) -> eyre::Result<()> {
        let guids: Vec<String> = self.entries.keys().cloned().collect();

        for guid in guids {
            self.find_references(&guid)?;
        }

        Ok(())
    }

    /// Generates a fresh guid for the asset, rewrites its .meta and every
    /// referencing file, and re-keys the entry. Returns the new guid.
    pub fn regenerate(&mut self, guid: &str) -> eyre::Result<String> {
        let Some(entry) = self.entries.get(guid) else {
            return err!("Unknown guid {}", guid);
        };

        if entry.references.is_none() {
            self.find_references(guid)?;
        }

        // checked right above
        let entry = self.entries.remove(guid).unwrap();
        let new_guid = new_guid();

        replace_in_file(&entry.meta_path(), guid, &new_guid)?;

        for path in entry.references.as_deref().unwrap_or_default() {
            replace_in_file(path, guid, &new_guid)?;
        }

        self.log(format!("Replaced guid {} with {}", guid, new_guid));

        self.entries.insert(new_guid.clone(), entry);

        Ok(new_guid)
    }

    pub fn regenerate_all(&mut self) -> eyre::Result<()> {
        let guids: Vec<String> = self.entries.keys().cloned().collect();

        for guid in guids {
            self.regenerate(&guid)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pxtool-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const GUID: &str = "0123456789abcdef0123456789abcdef";

    fn seed_project(dir: &Path) {
        fs::create_dir_all(dir.join("sprites")).unwrap();
        fs::write(dir.join("sprites/hero.png"), b"not a real png").unwrap();
        fs::write(
            dir.join("sprites/hero.png.meta"),
            format!("fileFormatVersion: 2\nguid: {}\n", GUID),
        )
        .unwrap();
        fs::write(
            dir.join("level.unity"),
            format!("m_Sprite: {{fileID: 21300000, guid: {}, type: 3}}\n", GUID),
        )
        .unwrap();
        fs::write(dir.join("other.mat"), "m_Shader: {fileID: 46}\n").unwrap();
    }

    #[test]
    fn new_guids_are_hex_and_distinct() {
        let a = new_guid();
        let b = new_guid();

        assert_eq!(a.len(), GUID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn meta_guid_parses_the_sidecar() {
        let text = format!("fileFormatVersion: 2\nguid: {}\nTextureImporter:\n", GUID);

        assert_eq!(meta_guid(&text), Some(GUID));
        assert_eq!(meta_guid("fileFormatVersion: 2\n"), None);
        assert_eq!(meta_guid("guid: tooshort\n"), None);
    }

    #[test]
    fn scan_collects_meta_guids() {
        let dir = test_dir("guidops-scan");
        seed_project(&dir);

        let ops = GuidOps::scan(dir.clone()).unwrap();

        assert_eq!(ops.entries().len(), 1);
        assert_eq!(ops.entries()[GUID].asset_path, dir.join("sprites/hero.png"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn references_are_found_and_rewritten() {
        let dir = test_dir("guidops-regen");
        seed_project(&dir);

        let mut ops = GuidOps::scan(dir.clone()).unwrap();

        assert_eq!(ops.find_references(GUID).unwrap(), 1);
        assert_eq!(
            ops.entries()[GUID].references.as_deref().unwrap(),
            &[dir.join("level.unity")]
        );

        let new_guid = ops.regenerate(GUID).unwrap();

        assert!(ops.entries().contains_key(&new_guid));
        assert!(!ops.entries().contains_key(GUID));

        let meta = fs::read_to_string(dir.join("sprites/hero.png.meta")).unwrap();
        assert!(meta.contains(&new_guid));
        assert!(!meta.contains(GUID));

        let scene = fs::read_to_string(dir.join("level.unity")).unwrap();
        assert!(scene.contains(&format!("guid: {}", new_guid)));
        assert!(!scene.contains(GUID));

        // files without the token stay untouched
        assert_eq!(
            fs::read_to_string(dir.join("other.mat")).unwrap(),
            "m_Shader: {fileID: 46}\n"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn regenerate_searches_when_references_are_unknown() {
        let dir = test_dir("guidops-lazy");
        seed_project(&dir);

        let mut ops = GuidOps::scan(dir.clone()).unwrap();
        let new_guid = ops.regenerate(GUID).unwrap();

        let scene = fs::read_to_string(dir.join("level.unity")).unwrap();
        assert!(scene.contains(&new_guid));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
