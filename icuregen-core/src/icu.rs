//! ICU build steps driven through a [`ToolRunner`].
//!
//! Every step takes the directories it works on explicitly and hands the
//! working directory to the runner per invocation, so the process working
//! directory is left alone on all paths.

use crate::artifacts::{
    self, ArtifactExpectation, copy_into, copy_tree, expect_artifacts, jars_equivalent, pattern_in,
};
use crate::error::RegenResult;
use crate::ports::{DataBuilder, ToolInvocation, ToolRunner};
use crate::settings::RegenSettings;
use crate::tree::SourceTree;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use icuregen_types::{BuildWorkspace, DerivedFileStatus, FilterConfiguration};
use tracing::{debug, info};

/// Name of the filter file written into a configured build directory.
pub const FILTER_FILE_NAME: &str = "icu4c_data_filters.json";

/// Number of ICU4J data jars a full build produces.
pub const ICU4J_JAR_COUNT: usize = 3;

/// Resources packed into a time-zone overlay `.dat`.
pub const TZ_RES_NAMES: [&str; 4] = [
    "metaZones.res",
    "timezoneTypes.res",
    "windowsZones.res",
    "zoneinfo64.res",
];

const LOCALE_DISTANCE_BUILDER: &str = "com.ibm.icu.dev.tool.locale.LocaleDistanceBuilder";

/// What [`IcuToolchain::make_and_copy_icu_data_files`] placed in the source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopiedData {
    pub dat_file: Utf8PathBuf,
    pub jars_copied: Vec<Utf8PathBuf>,
    pub jars_unchanged: Vec<Utf8PathBuf>,
    pub test_data: Option<Utf8PathBuf>,
}

pub struct IcuToolchain<'a> {
    runner: &'a dyn ToolRunner,
    tree: SourceTree,
    settings: RegenSettings,
}

impl<'a> IcuToolchain<'a> {
    pub fn new(runner: &'a dyn ToolRunner, settings: RegenSettings) -> Self {
        Self {
            runner,
            tree: SourceTree::new(settings.android_root.clone()),
            settings,
        }
    }

    /// Create a fresh, uniquely named workspace under the scratch root.
    pub fn new_workspace(&self) -> RegenResult<BuildWorkspace> {
        let parent = match &self.settings.scratch_root {
            Some(dir) => {
                fs::create_dir_all(dir).with_context(|| format!("create {}", dir))?;
                dir.clone().into_std_path_buf()
            }
            None => std::env::temp_dir(),
        };
        let dir = tempfile::Builder::new()
            .prefix("icuregen-")
            .tempdir_in(&parent)
            .with_context(|| format!("create build workspace in {}", parent.display()))?
            .keep();
        let root = Utf8PathBuf::from_path_buf(dir)
            .map_err(|p| anyhow::anyhow!("non UTF-8 workspace path {}", p.display()))?;
        debug!(workspace = %root, "created build workspace");
        Ok(BuildWorkspace::new(root))
    }

    /// Create `icu_build_dir` if needed and run `runConfigureICU Linux` in it.
    pub fn prepare_icu_build(
        &self,
        icu_build_dir: &Utf8Path,
        filters: Option<FilterConfiguration>,
    ) -> RegenResult<()> {
        fs::create_dir_all(icu_build_dir).with_context(|| format!("create {}", icu_build_dir))?;

        let icu4c = self.tree.icu4c_dir()?;
        info!(build_dir = %icu_build_dir, "configuring ICU tools");

        let mut inv = ToolInvocation::new(icu4c.join("runConfigureICU").into_string(), icu_build_dir);
        if let Some(filters) = filters {
            let json_path = icu_build_dir.join(FILTER_FILE_NAME);
            let json = filters.to_json().context("serialize data filters")?;
            fs::write(&json_path, json).with_context(|| format!("write {}", json_path))?;
            info!(filters = %filters, path = %json_path, "wrote data filters");
            inv = inv.env("ICU_DATA_FILTER_FILE", json_path.as_str());
        }
        let inv = inv
            .env("ICU_DATA_BUILDTOOL_OPTS", "--include_uni_core_data")
            .arg("Linux");

        self.runner.run(&inv)
    }

    /// Build and run the tz2icu tools against an IANA tzdata tarball, then copy
    /// the resulting `zoneinfo64.txt` into the ICU4C source tree.
    pub fn make_tz_data_files(
        &self,
        icu_build_dir: &Utf8Path,
        iana_tar_file: &Utf8Path,
    ) -> RegenResult<Utf8PathBuf> {
        let icu4c = self.tree.icu4c_dir()?;
        let tzcode_dir = icu_build_dir.join("tools/tzcode");
        fs::create_dir_all(&tzcode_dir).with_context(|| format!("create {}", tzcode_dir))?;

        // tz2icu only picks up icuregions and icuzones from its working directory.
        for name in ["icuregions", "icuzones"] {
            let source = icu4c.join("tools/tzcode").join(name);
            let link = tzcode_dir.join(name);
            link_file(&source, &link)?;
        }

        let tar_name = iana_tar_file
            .file_name()
            .with_context(|| format!("{} has no file name", iana_tar_file))?;
        let working_tar = tzcode_dir.join(tar_name);
        fs::copy(iana_tar_file, &working_tar)
            .with_context(|| format!("copy {} to {}", iana_tar_file, working_tar))?;

        info!("making ICU tz data files");
        // The tzcode Makefile expects the bin directory to exist.
        let bin_dir = icu_build_dir.join("bin");
        fs::create_dir_all(&bin_dir).with_context(|| format!("create {}", bin_dir))?;

        // The tzcode build is not parallelizable.
        let make = ToolInvocation::new("make", icu_build_dir).args([
            "-j1".to_string(),
            "-C".to_string(),
            tzcode_dir.to_string(),
        ]);
        self.runner.run(&make)?;

        let misc_dir = icu4c.join("data/misc");
        info!(dest = %misc_dir, "copying zoneinfo64.txt");
        copy_into(&tzcode_dir.join("zoneinfo64.txt"), &misc_dir)
    }

    /// Build the ICU `.dat` (and unless `dat_only`, the ICU4J jars and test data)
    /// and copy them into their places in the source tree.
    pub fn make_and_copy_icu_data_files(
        &self,
        icu_build_dir: &Utf8Path,
        dat_only: bool,
    ) -> RegenResult<CopiedData> {
        let icu4c = self.tree.icu4c_dir()?;
        self.make(icu_build_dir, None)?;

        let dat_file = artifacts::dat_file(icu_build_dir)?;
        let stubdata = icu4c.join("stubdata");
        info!(src = %dat_file, dest = %stubdata, "copying .dat file");
        let mut copied = CopiedData {
            dat_file: copy_into(&dat_file, &stubdata)?,
            ..CopiedData::default()
        };

        if dat_only {
            return Ok(copied);
        }

        self.make(icu_build_dir, Some("icu4j-data"))?;
        self.make(icu_build_dir, Some("tests"))?;

        let jars = expect_artifacts(
            ".jar files",
            &pattern_in(icu_build_dir, "data/out/icu4j/*.jar"),
            ArtifactExpectation::Exactly(ICU4J_JAR_COUNT),
        )?;
        let jar_dir = self.tree.icu4j_dir()?.join("main/shared/data");
        for jar in jars {
            let name = jar
                .file_name()
                .with_context(|| format!("{} has no file name", jar))?;
            let committed = jar_dir.join(name);
            if jars_equivalent(&jar, &committed)? {
                info!(jar = %jar, "ignoring jar identical to {}", committed);
                copied.jars_unchanged.push(committed);
            } else {
                info!(jar = %jar, dest = %jar_dir, "copying jar");
                copied.jars_copied.push(copy_into(&jar, &jar_dir)?);
            }
        }

        let testdata_out = icu4c.join("test/testdata/out");
        info!(dest = %testdata_out, "copying test data");
        if testdata_out.exists() {
            fs::remove_dir_all(&testdata_out)
                .with_context(|| format!("remove {}", testdata_out))?;
        }
        copy_tree(&icu_build_dir.join("test/testdata/out"), &testdata_out)?;
        copied.test_data = Some(testdata_out);

        Ok(copied)
    }

    /// Build a `.dat` holding only time-zone resources, usable as an overlay on
    /// top of a full ICU `.dat` to ship newer rules.
    pub fn make_and_copy_overlay_tz_icu_data(
        &self,
        icu_build_dir: &Utf8Path,
        dest_file: &Utf8Path,
    ) -> RegenResult<()> {
        self.make(icu_build_dir, None)?;

        let dat_file = artifacts::dat_file(icu_build_dir)?;
        let package_dat = dat_file
            .file_name()
            .with_context(|| format!("{} has no file name", dat_file))?
            .to_string();
        let package = package_dat
            .strip_suffix(".dat")
            .with_context(|| format!("{} does not end with .dat", package_dat))?;

        let staging = icu_build_dir.join("overlay_res");
        fs::create_dir_all(&staging).with_context(|| format!("create {}", staging))?;

        let res_src = icu_build_dir.join("data/out/build").join(package);
        for name in TZ_RES_NAMES {
            copy_into(&res_src.join(name), &staging)?;
        }

        let list_file = staging.join("tzdata.lst");
        let mut list = String::new();
        for name in TZ_RES_NAMES {
            list.push_str(name);
            list.push('\n');
        }
        fs::write(&list_file, list).with_context(|| format!("write {}", list_file))?;

        // pkgdata resolves the .lst entries, and names resources, relative to its
        // working directory, so it runs inside the staging dir.
        //   -F force rebuild, -m common make a .dat, -T/-d temp and dest dirs
        let pkgdata = ToolInvocation::new(icu_build_dir.join("bin/pkgdata").into_string(), &staging)
            .args(["-F", "-m", "common", "-v", "-T", ".", "-d", ".", "-p", package])
            .arg(list_file.as_str())
            .env("LD_LIBRARY_PATH", icu_build_dir.join("lib").as_str());
        self.runner.run(&pkgdata)?;

        let generated = staging.join(&package_dat);
        fs::copy(&generated, dest_file)
            .with_context(|| format!("copy {} to {}", generated, dest_file))?;
        info!(dest = %dest_file, "ICU overlay .dat written");
        Ok(())
    }

    /// Regenerate `langInfo.txt` with ICU4J's `LocaleDistanceBuilder`.
    ///
    /// The committed copy is overwritten only when the fresh output differs.
    pub fn make_lang_info(&self) -> RegenResult<DerivedFileStatus> {
        let committed = self.tree.lang_info_file()?;
        let fresh = &self.settings.lang_info_out;
        info!(path = %committed, "building langInfo.txt");
        if fresh.exists() {
            fs::remove_file(fresh).with_context(|| format!("remove stale {}", fresh))?;
        }

        let icu4j = self.tree.icu4j_dir()?;
        self.runner
            .run(&ToolInvocation::new("ant", &icu4j).arg("icu4jJar"))?;

        let tools_dir = icu4j.join("tools/misc");
        self.runner
            .run(&ToolInvocation::new("ant", &tools_dir).arg("jar"))?;
        self.runner.run(
            &ToolInvocation::new("java", &tools_dir).args([
                "-cp",
                "out/lib/icu4j-tools.jar:../../icu4j.jar",
                LOCALE_DISTANCE_BUILDER,
            ]),
        )?;

        let fresh_bytes = fs::read(fresh).with_context(|| format!("read {}", fresh))?;
        let committed_bytes = fs::read(&committed).with_context(|| format!("read {}", committed))?;
        if fresh_bytes == committed_bytes {
            info!("{} and {} are the same", fresh, committed);
            return Ok(DerivedFileStatus::Unchanged);
        }

        info!("copying {} to {}", fresh, committed);
        fs::write(&committed, &fresh_bytes).with_context(|| format!("write {}", committed))?;
        Ok(DerivedFileStatus::Changed)
    }

    /// One full build in a fresh workspace with the ML filters.
    pub fn make_icu_data_files_once(&self) -> RegenResult<BuildWorkspace> {
        let workspace = self.new_workspace()?;
        let build_dir = workspace.icu_build_dir();
        self.prepare_icu_build(&build_dir, Some(FilterConfiguration::MachineLearning))?;
        self.make_and_copy_icu_data_files(&build_dir, false)?;
        Ok(workspace)
    }

    /// Rebuild an existing workspace without the time-zone resources (roughly
    /// 200 KB smaller) and copy only the ICU4C `.dat`.
    ///
    /// ICU4J jars and test data from this build are incomplete for host tools,
    /// so they are left in the workspace.
    pub fn make_icu_data_files_without_time_zone_files(
        &self,
        workspace: &BuildWorkspace,
    ) -> RegenResult<CopiedData> {
        let build_dir = workspace.icu_build_dir();

        // make does not notice the filter change unless the list is rebuilt.
        let list_file = build_dir.join("data/out/tmp/icudata.lst");
        match fs::remove_file(&list_file) {
            Ok(()) => debug!(path = %list_file, "removed stale data list"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("remove {}", list_file))
                    .into());
            }
        }

        self.prepare_icu_build(&build_dir, Some(FilterConfiguration::WithoutTimeZones))?;
        self.make_and_copy_icu_data_files(&build_dir, true)
    }

    /// Copy the ICU license into `target_dir`.
    pub fn copy_license_files(&self, target_dir: &Utf8Path) -> RegenResult<Utf8PathBuf> {
        let license = self.tree.icu4j_dir()?.join("main/shared/licenses/LICENSE");
        info!(src = %license, dest = %target_dir, "copying license");
        copy_into(&license, target_dir)
    }

    fn make(&self, icu_build_dir: &Utf8Path, target: Option<&str>) -> RegenResult<()> {
        let mut inv =
            ToolInvocation::new("make", icu_build_dir).arg(format!("-j{}", self.settings.make_jobs));
        if let Some(target) = target {
            inv = inv.arg(target);
        }
        self.runner.run(&inv)
    }
}

impl DataBuilder for IcuToolchain<'_> {
    fn build(&mut self) -> RegenResult<BuildWorkspace> {
        self.make_icu_data_files_once()
    }

    fn regenerate_derived_file(&mut self) -> RegenResult<DerivedFileStatus> {
        self.make_lang_info()
    }

    fn derived_file(&self) -> RegenResult<Utf8PathBuf> {
        self.tree.lang_info_file()
    }

    fn final_build_variant(&mut self, workspace: &BuildWorkspace) -> RegenResult<()> {
        self.make_icu_data_files_without_time_zone_files(workspace)
            .map(|_| ())
    }
}

#[cfg(unix)]
fn link_file(source: &Utf8Path, link: &Utf8Path) -> RegenResult<()> {
    fs_err::os::unix::fs::symlink(source, link)
        .with_context(|| format!("symlink {} to {}", link, source))?;
    Ok(())
}

#[cfg(not(unix))]
fn link_file(source: &Utf8Path, link: &Utf8Path) -> RegenResult<()> {
    fs::copy(source, link).with_context(|| format!("copy {} to {}", source, link))?;
    Ok(())
}
