use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use joblib::{Job, DEFAULT_KIND};
use serde::Deserialize;

use crate::arg_parser::Variant;

/// Interpreter used when neither the command line nor the config names one.
pub const DEFAULT_INTERPRETER: &str = "python3";

const STANDARD: &str = include_str!("../variants/standard.toml");
const LITE: &str = include_str!("../variants/lite.toml");

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("couldn't load config file at '{}': {}", .0.display(), .1)]
    MissingConfig(PathBuf, std::io::Error),
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    #[error("no jobs configured")]
    NoJobs,
    #[error("job #{0} has an empty name")]
    EmptyName(usize),
    #[error("job name '{0}' is used more than once")]
    DuplicateName(String),
    #[error("no job named '{0}' (configured: {1})")]
    UnknownJob(String, String),
    #[error("couldn't create data directory '{}'", .0.display())]
    DataDir(PathBuf, #[source] std::io::Error),
}

/// The set of jobs to supervise and how to launch them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Program that runs each job's script, unless the job names its own.
    #[serde(default)]
    pub interpreter: Option<String>,
    /// Directory, relative to the root, created before any job starts.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Word used for jobs in the supervisor's own output lines.
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Environment passed to every job.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct JobSpec {
    pub name: String,
    /// Script path relative to the root.
    pub script: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory relative to the root (default: the root itself).
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Run the script with this program instead of the interpreter.
    #[serde(default)]
    pub program: Option<String>,
}

impl Config {
    fn parse(contents: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file given an absolute or relative path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let full_path = std::path::absolute(path).map_err(Error::IO)?;
        let contents = std::fs::read_to_string(&full_path)
            .map_err(|err| Error::MissingConfig(full_path, err))?;
        Self::parse(&contents)
    }

    /// One of the job sets shipped with the binary.
    pub fn builtin(variant: Variant) -> Result<Self, Error> {
        match variant {
            Variant::Standard => Self::parse(STANDARD),
            Variant::Lite => Self::parse(LITE),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.jobs.is_empty() {
            return Err(Error::NoJobs);
        }
        let mut seen = HashSet::new();
        for (index, job) in self.jobs.iter().enumerate() {
            if job.name.trim().is_empty() {
                return Err(Error::EmptyName(index));
            }
            if !seen.insert(fold_case(&job.name)) {
                return Err(Error::DuplicateName(job.name.clone()));
            }
        }
        Ok(())
    }

    /// Keep only the named jobs (matched case-insensitively), in declaration order.
    ///
    /// An empty selection keeps every job.
    pub fn select(mut self, names: &[String]) -> Result<Self, Error> {
        if names.is_empty() {
            return Ok(self);
        }
        let wanted: HashSet<String> = names.iter().map(|name| fold_case(name)).collect();
        for name in names {
            if !self.jobs.iter().any(|job| fold_case(&job.name) == fold_case(name)) {
                let known = self
                    .jobs
                    .iter()
                    .map(|job| job.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(Error::UnknownJob(name.clone(), known));
            }
        }
        self.jobs.retain(|job| wanted.contains(&fold_case(&job.name)));
        Ok(self)
    }

    /// Build the launchable jobs: `<program> <root>/<script> <args..>` run in `<root>/<dir>`.
    ///
    /// `extra_envs` are applied after the configured environment and win over it.
    pub fn to_jobs(&self, root: &Path, interpreter: &str, extra_envs: &[(String, String)]) -> Vec<Job> {
        self.jobs
            .iter()
            .map(|spec| {
                let program = spec.program.as_deref().unwrap_or(interpreter);
                let dir = match spec.dir {
                    Some(ref dir) => root.join(dir),
                    None => root.to_path_buf(),
                };
                Job::new(&spec.name, program)
                    .arg(root.join(&spec.script).to_string_lossy())
                    .args(spec.args.iter().cloned())
                    .dir(dir)
                    .envs(self.env.iter().map(|(k, v)| (k.clone(), v.clone())))
                    .envs(extra_envs.iter().cloned())
            })
            .collect()
    }

    /// Create the data directory under `root`, if one is configured.
    pub fn prepare_data_dir(&self, root: &Path) -> Result<Option<PathBuf>, Error> {
        let Some(ref data_dir) = self.data_dir else {
            return Ok(None);
        };
        let path = root.join(data_dir);
        std::fs::create_dir_all(&path).map_err(|err| Error::DataDir(path.clone(), err))?;
        Ok(Some(path))
    }
}

/// Pick the interpreter: command line (or `$PYTHON`), then the config, then the default.
pub fn resolve_interpreter(cli: Option<&str>, config: &Config) -> String {
    cli.or(config.interpreter.as_deref())
        .unwrap_or(DEFAULT_INTERPRETER)
        .to_string()
}

/// Compute the absolute project root.
///
/// An explicit root wins, then the directory holding the config file, then the
/// current directory.
pub fn resolve_root(
    root_override: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<PathBuf, Error> {
    let root = match (root_override, config_file) {
        (Some(root), _) => root.to_path_buf(),
        (None, Some(file)) => {
            let file = std::path::absolute(file)?;
            file.parent().map(Path::to_path_buf).unwrap_or(file)
        }
        (None, None) => std::env::current_dir()?,
    };
    std::path::absolute(root).map_err(Error::IO)
}

/// Job names are compared case-insensitively everywhere.
fn fold_case(name: &str) -> String {
    name.to_lowercase()
}

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn config(jobs: &[&str]) -> Config {
        Config {
            interpreter: None,
            data_dir: None,
            kind: default_kind(),
            env: BTreeMap::new(),
            jobs: jobs
                .iter()
                .map(|name| JobSpec {
                    name: name.to_string(),
                    script: PathBuf::from(format!("src/{}.py", name.to_lowercase())),
                    args: vec![],
                    dir: None,
                    program: None,
                })
                .collect(),
        }
    }

    fn names(config: &Config) -> Vec<&str> {
        config.jobs.iter().map(|job| job.name.as_str()).collect()
    }

    #[test]
    fn parses_minimal() {
        let config = Config::parse(indoc! {r#"
            [[jobs]]
            name = "APRA"
            script = "src/correct_apra.py"
        "#})
        .unwrap();
        assert_eq!(config.interpreter, None);
        assert_eq!(config.data_dir, None);
        assert_eq!(config.kind, "scraper");
        assert!(config.env.is_empty());
        assert_eq!(names(&config), ["APRA"]);
        assert!(config.jobs[0].args.is_empty());
    }

    #[test]
    fn parses_full() {
        let config = Config::parse(indoc! {r#"
            interpreter = "pypy3"
            data-dir = "out"
            kind = "crawler"

            [env]
            PYTHONUNBUFFERED = "1"

            [[jobs]]
            name = "FMA"
            script = "src/correct_fma_govt_nz_2.py"
            args = ["--save"]
            dir = "src"
            program = "uv"
        "#})
        .unwrap();
        assert_eq!(config.interpreter.as_deref(), Some("pypy3"));
        assert_eq!(config.data_dir, Some(PathBuf::from("out")));
        assert_eq!(config.kind, "crawler");
        assert_eq!(config.env.get("PYTHONUNBUFFERED").map(String::as_str), Some("1"));
        let job = &config.jobs[0];
        assert_eq!(job.args, ["--save"]);
        assert_eq!(job.dir, Some(PathBuf::from("src")));
        assert_eq!(job.program.as_deref(), Some("uv"));
    }

    #[test]
    fn rejects_bad_configs() {
        assert!(matches!(Config::parse(""), Err(Error::NoJobs)));
        assert!(matches!(
            Config::parse(indoc! {r#"
                [[jobs]]
                name = " "
                script = "a.py"
            "#}),
            Err(Error::EmptyName(0))
        ));
        assert!(matches!(
            Config::parse(indoc! {r#"
                [[jobs]]
                name = "RBA"
                script = "a.py"

                [[jobs]]
                name = "rba"
                script = "b.py"
            "#}),
            Err(Error::DuplicateName(name)) if name == "rba"
        ));
        assert!(matches!(
            Config::parse(indoc! {r#"
                [[jobs]]
                name = "RBA"
                script = "a.py"
                timeout = 30
            "#}),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn builtin_variants() {
        let standard = Config::builtin(Variant::Standard).unwrap();
        assert_eq!(names(&standard), ["APRA", "FMA", "RBNZ", "RBA"]);
        let lite = Config::builtin(Variant::Lite).unwrap();
        assert_eq!(names(&lite), ["APRA", "RBNZ", "RBA"]);

        let rba_script = |config: &Config| config.jobs.last().unwrap().script.clone();
        assert_eq!(rba_script(&standard), PathBuf::from("src/correct_rba_news_3.py"));
        assert_eq!(rba_script(&lite), PathBuf::from("src/correct_rba_3.py"));

        for config in [&standard, &lite] {
            assert_eq!(config.data_dir, Some(PathBuf::from("data")));
            assert_eq!(config.env.get("PYTHONUNBUFFERED").map(String::as_str), Some("1"));
        }
    }

    #[test]
    fn selects_in_declaration_order() {
        let selected = config(&["APRA", "FMA", "RBNZ", "RBA"])
            .select(&["rba".to_string(), "Apra".to_string()])
            .unwrap();
        assert_eq!(names(&selected), ["APRA", "RBA"]);

        let all = config(&["APRA", "FMA"]).select(&[]).unwrap();
        assert_eq!(names(&all), ["APRA", "FMA"]);
    }

    #[test]
    fn names_fold_case_the_same_way_everywhere() {
        let selected = config(&["ÄRZTE", "FMA"])
            .select(&["ärzte".to_string()])
            .unwrap();
        assert_eq!(names(&selected), ["ÄRZTE"]);

        assert!(matches!(
            Config::parse(indoc! {r#"
                [[jobs]]
                name = "ÄRZTE"
                script = "a.py"

                [[jobs]]
                name = "ärzte"
                script = "b.py"
            "#}),
            Err(Error::DuplicateName(name)) if name == "ärzte"
        ));
    }

    #[test]
    fn unknown_selection_is_an_error() {
        let err = config(&["APRA", "FMA"])
            .select(&["ASIC".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "no job named 'ASIC' (configured: APRA, FMA)");
    }

    #[test]
    fn jobs_resolve_against_root() {
        let mut config = config(&["APRA", "FMA"]);
        config.env.insert("PYTHONUNBUFFERED".into(), "1".into());
        config.jobs[1].program = Some("sh".into());
        config.jobs[1].dir = Some(PathBuf::from("src"));
        config.jobs[1].args = vec!["--save".into()];

        let root = Path::new("/srv/scrapers");
        let extra = [("TZ".to_string(), "UTC".to_string())];
        let jobs = config.to_jobs(root, "python3.12", &extra);

        assert_eq!(jobs[0].name(), "APRA");
        assert_eq!(jobs[0].program(), "python3.12");
        assert_eq!(jobs[0].arguments(), ["/srv/scrapers/src/apra.py"]);
        assert_eq!(jobs[0].working_dir(), &PathBuf::from("/srv/scrapers"));
        assert_eq!(
            jobs[0].environment(),
            [
                ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
                ("TZ".to_string(), "UTC".to_string()),
            ]
        );

        assert_eq!(jobs[1].program(), "sh");
        assert_eq!(jobs[1].arguments(), ["/srv/scrapers/src/fma.py", "--save"]);
        assert_eq!(jobs[1].working_dir(), &PathBuf::from("/srv/scrapers/src"));
    }

    #[test]
    fn interpreter_precedence() {
        let mut config = config(&["APRA"]);
        assert_eq!(resolve_interpreter(None, &config), "python3");
        config.interpreter = Some("pypy3".into());
        assert_eq!(resolve_interpreter(None, &config), "pypy3");
        assert_eq!(resolve_interpreter(Some("python3.11"), &config), "python3.11");
    }

    #[test]
    fn root_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("jobs.toml");

        let root = resolve_root(Some(Path::new("/srv/scrapers")), Some(file.as_path())).unwrap();
        assert_eq!(root, PathBuf::from("/srv/scrapers"));

        let root = resolve_root(None, Some(file.as_path())).unwrap();
        assert_eq!(root, dir.path());

        let root = resolve_root(None, None).unwrap();
        assert_eq!(root, std::env::current_dir().unwrap());
        assert!(root.is_absolute());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.toml");
        std::fs::write(&path, "[[jobs]]\nname = \"RBNZ\"\nscript = \"src/correct_rbnz_1.py\"\n")
            .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(names(&config), ["RBNZ"]);

        let missing = Config::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, Error::MissingConfig(..)));
    }

    #[test]
    fn creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&["APRA"]);
        assert_eq!(config.prepare_data_dir(dir.path()).unwrap(), None);

        config.data_dir = Some(PathBuf::from("data"));
        let created = config.prepare_data_dir(dir.path()).unwrap().unwrap();
        assert!(created.is_dir());
        // a second run finds it already there
        assert!(config.prepare_data_dir(dir.path()).is_ok());
    }
}
