pub mod paths;
pub mod profile;
pub mod registry;
pub mod settings;

pub use paths::{CONFIG_DIR_ENV, ensure_config_dir, resolve_config_dir};
pub use profile::{DEFAULT_PORT, HostProfile, ProfileDraft};
pub use registry::{HOSTS_FILE_NAME, HostRegistry};
pub use settings::AppSettings;
