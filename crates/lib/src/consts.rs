/// File name looked up in the root directory when a directory is given.
pub const CONFIG_FILE: &str = "jake.yml";

/// Optional Lua script evaluated into the build's helper scope.
pub const HELPER_FILE: &str = "Jakefile";

pub const DEFAULT_EXTENSION: &str = "js";

/// Variant written when `builds` is absent from the config.
pub const DEFAULT_VARIANT: &str = "src";

/// Placed between concatenated fragments: two blank lines.
pub const SEPARATOR: &str = "\n\n\n";
