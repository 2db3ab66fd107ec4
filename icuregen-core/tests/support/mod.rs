//! Fake Android source tree and a scripted stand-in for the ICU build tools.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use icuregen_core::error::{RegenError, RegenResult};
use icuregen_core::ports::{ToolInvocation, ToolRunner};
use icuregen_core::RegenSettings;
use std::cell::{Cell, RefCell};
use tempfile::TempDir;

pub const COMMITTED_LANG_INFO: &str = "langInfo v1\n";

pub struct FakeTree {
    _temp: TempDir,
    pub root: Utf8PathBuf,
}

impl FakeTree {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("utf8")
            .canonicalize_utf8()
            .expect("canonical");

        for dir in [
            "external/icu/icu4c/source/stubdata",
            "external/icu/icu4c/source/data/misc",
            "external/icu/icu4c/source/tools/tzcode",
            "external/icu/icu4c/source/test/testdata",
            "external/icu/icu4j/main/shared/data",
            "external/icu/icu4j/main/shared/licenses",
            "external/icu/icu4j/tools/misc",
            "tmp",
            "scratch",
        ] {
            std::fs::create_dir_all(root.join(dir)).expect("mkdir");
        }
        write(&root.join("external/icu/icu4c/source/runConfigureICU"), "#!/bin/sh\n");
        write(
            &root.join("external/icu/icu4c/source/data/misc/langInfo.txt"),
            COMMITTED_LANG_INFO,
        );
        write(&root.join("external/icu/icu4c/source/tools/tzcode/icuregions"), "regions");
        write(&root.join("external/icu/icu4c/source/tools/tzcode/icuzones"), "zones");
        write(&root.join("external/icu/icu4j/main/shared/licenses/LICENSE"), "ICU license");

        Self { _temp: temp, root }
    }

    pub fn settings(&self) -> RegenSettings {
        RegenSettings {
            android_root: self.root.clone(),
            scratch_root: Some(self.root.join("scratch")),
            lang_info_out: self.lang_info_out(),
            make_jobs: 32,
            max_iterations: Some(10),
        }
    }

    pub fn icu4c(&self) -> Utf8PathBuf {
        self.root.join("external/icu/icu4c/source")
    }

    pub fn icu4j(&self) -> Utf8PathBuf {
        self.root.join("external/icu/icu4j")
    }

    pub fn lang_info_out(&self) -> Utf8PathBuf {
        self.root.join("tmp/langInfo.txt")
    }

    pub fn committed_lang_info(&self) -> String {
        std::fs::read_to_string(self.icu4c().join("data/misc/langInfo.txt")).expect("read")
    }

    pub fn stubdata_files(&self) -> Vec<Utf8PathBuf> {
        list(&self.icu4c().join("stubdata"))
    }

    pub fn jar_dir_files(&self) -> Vec<Utf8PathBuf> {
        list(&self.icu4j().join("main/shared/data"))
    }
}

pub fn write(path: &Utf8Path, contents: &str) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, contents).expect("write");
}

/// A jar with the given entries, all stamped with January 1st of `year`.
pub fn write_jar(path: &Utf8Path, year: u16, entries: &[(&str, &str)]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    let stamp = zip::DateTime::from_date_and_time(year, 1, 1, 0, 0, 0).expect("date");
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(stamp);
    let mut writer = zip::ZipWriter::new(std::fs::File::create(path).expect("create"));
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(contents.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish");
}

pub fn list(dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    let mut out: Vec<Utf8PathBuf> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| Utf8PathBuf::from_path_buf(e.expect("entry").path()).expect("utf8"))
        .collect();
    out.sort();
    out
}

/// Behaves like the ICU build tools just enough to exercise the pipeline.
///
/// `make` writes `dat_count` .dat files whose content is the active filter
/// file, `make icu4j-data` writes `jar_count` jars, `java` writes the next
/// entry of `lang_info_outputs` (repeating the last one).
pub struct FakeIcu {
    pub dat_count: usize,
    pub jar_count: usize,
    pub lang_info_outputs: Vec<String>,
    pub lang_info_out: Utf8PathBuf,
    pub fail_program: Option<String>,
    /// Content of the single entry in every built jar.
    pub jar_payload: String,
    calls: RefCell<Vec<ToolInvocation>>,
    java_runs: Cell<usize>,
    jar_builds: Cell<usize>,
}

impl FakeIcu {
    pub fn new(tree: &FakeTree) -> Self {
        Self {
            dat_count: 1,
            jar_count: 3,
            lang_info_outputs: vec![COMMITTED_LANG_INFO.to_string()],
            lang_info_out: tree.lang_info_out(),
            fail_program: None,
            jar_payload: "icu4j data v1".to_string(),
            calls: RefCell::new(Vec::new()),
            java_runs: Cell::new(0),
            jar_builds: Cell::new(0),
        }
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, program: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program_name() == program)
            .count()
    }

    pub fn ran_make_target(&self, target: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| c.program_name() == "make" && c.args.iter().any(|a| a == target))
    }

    fn fake_make(&self, inv: &ToolInvocation) {
        let cwd = &inv.current_dir;
        if let Some(pos) = inv.args.iter().position(|a| a == "-C") {
            let dir = Utf8PathBuf::from(&inv.args[pos + 1]);
            write(&dir.join("zoneinfo64.txt"), "zoneinfo64 from tzdata");
            return;
        }
        match inv.args.get(1).map(String::as_str) {
            None => {
                let filters = std::fs::read_to_string(cwd.join("icu4c_data_filters.json"))
                    .unwrap_or_else(|_| "unfiltered".to_string());
                for i in 0..self.dat_count {
                    write(
                        &cwd.join(format!("data/out/tmp/icudt{}l.dat", 77 + i)),
                        &filters,
                    );
                }
                write(&cwd.join("data/out/tmp/icudata.lst"), "list");
                for res in ["metaZones", "timezoneTypes", "windowsZones", "zoneinfo64"] {
                    write(
                        &cwd.join(format!("data/out/build/icudt77l/{res}.res")),
                        res,
                    );
                }
            }
            Some("icu4j-data") => {
                // Every build stamps its jars with a new time, like a real build.
                let build = self.jar_builds.get() + 1;
                self.jar_builds.set(build);
                let names = ["icudata.jar", "icutzdata.jar", "testdata.jar"];
                for i in 0..self.jar_count {
                    let name = names
                        .get(i)
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| format!("extra{i}.jar"));
                    write_jar(
                        &cwd.join("data/out/icu4j").join(&name),
                        2000 + build as u16,
                        &[(name.as_str(), self.jar_payload.as_str())],
                    );
                }
            }
            Some("tests") => {
                write(&cwd.join("test/testdata/out/testdata/root.res"), "root");
            }
            Some(other) => panic!("unexpected make target {other}"),
        }
    }
}

impl ToolRunner for FakeIcu {
    fn run(&self, inv: &ToolInvocation) -> RegenResult<()> {
        self.calls.borrow_mut().push(inv.clone());
        if self.fail_program.as_deref() == Some(inv.program_name()) {
            return Err(RegenError::ToolFailed {
                program: inv.program.clone(),
                code: Some(2),
            });
        }

        match inv.program_name() {
            "runConfigureICU" | "ant" => {}
            "make" => self.fake_make(inv),
            "java" => {
                let i = self.java_runs.get();
                self.java_runs.set(i + 1);
                let out = self
                    .lang_info_outputs
                    .get(i)
                    .or(self.lang_info_outputs.last())
                    .expect("lang info output");
                write(&self.lang_info_out, out);
            }
            "pkgdata" => {
                let pos = inv.args.iter().position(|a| a == "-p").expect("-p");
                let package = &inv.args[pos + 1];
                let list_file = inv.args.last().expect("list file");
                let list = std::fs::read_to_string(list_file).expect("read list");
                write(&inv.current_dir.join(format!("{package}.dat")), &list);
            }
            other => panic!("unexpected tool {other}"),
        }
        Ok(())
    }
}
