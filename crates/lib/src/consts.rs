/// Environment variable overriding repository root discovery.
pub const ROOT_ENV: &str = "RIG_ROOT";

/// Environment variable overriding the CMake program.
pub const CMAKE_ENV: &str = "RIG_CMAKE";

pub const DEFAULT_CMAKE: &str = "cmake";

/// Dependency cache directory, relative to the repository root.
pub const DEPS_DIR: &str = "external";

pub const BUILD_DIR: &str = "build";

pub const OUTPUT_DIR: &str = "bin";

pub const ASSETS_DIR: &str = "shaders";

pub const EXECUTABLE_NAME: &str = "game";

/// File whose presence marks a build directory as configured.
pub const CONFIGURE_MARKER: &str = "CMakeCache.txt";

pub const COMPILE_DATABASE: &str = "compile_commands.json";
