use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    DepartmentsEmpty(String),
    DuplicateDepartment(String),
    AccountsEmpty(String),
    BadBadgePrefix(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::DepartmentsEmpty(e) => write!(f, "Departments configuration error: {}", e),
            ConfigError::DuplicateDepartment(e) => write!(f, "Duplicate department: {}", e),
            ConfigError::AccountsEmpty(e) => write!(f, "Accounts configuration error: {}", e),
            ConfigError::BadBadgePrefix(e) => write!(f, "Badge prefix error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum StorageError {
    ConnectionFailed,
    WriteFailed,
    ReadFailed,
    CorruptValue(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionFailed => write!(f, "Storage connection failed"),
            StorageError::WriteFailed => write!(f, "Storage write failed"),
            StorageError::ReadFailed => write!(f, "Storage read failed"),
            StorageError::CorruptValue(key) => write!(f, "Stored value for '{}' is corrupt", key),
        }
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    InvalidCredentials,
    NotAuthenticated,
    StorageError(StorageError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Username and password are required"),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::NotAuthenticated => write!(f, "Not authenticated"),
            AuthError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::StorageError(err)
    }
}

#[derive(Debug)]
pub enum RegistrationError {
    MissingFields(Vec<&'static str>),
    UnknownDepartment(String),
    InvalidEmail(String),
    InvalidDuration(String),
    UnknownField(String),
    NotFound(String),
    AlreadyCheckedOut(String),
    CodesExhausted,
    StorageError(StorageError),
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            RegistrationError::UnknownDepartment(d) => write!(f, "Unknown department: {}", d),
            RegistrationError::InvalidEmail(e) => write!(f, "Invalid email address: {}", e),
            RegistrationError::InvalidDuration(e) => write!(f, "Invalid expected duration: {}", e),
            RegistrationError::UnknownField(name) => write!(f, "Unknown form field: {}", name),
            RegistrationError::NotFound(code) => write!(f, "No visitor with code {}", code),
            RegistrationError::AlreadyCheckedOut(code) => {
                write!(f, "Visitor {} has already checked out", code)
            }
            RegistrationError::CodesExhausted => {
                write!(f, "Every registration code for this prefix is in use")
            }
            RegistrationError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for RegistrationError {}

impl From<StorageError> for RegistrationError {
    fn from(err: StorageError) -> Self {
        RegistrationError::StorageError(err)
    }
}

#[derive(Debug)]
pub enum WebError {
    BindFailed(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BindFailed(e) => write!(f, "Web server bind failed: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    StorageError(StorageError),
    AuthError(AuthError),
    RegistrationError(RegistrationError),
    WebError(WebError),
    InitializationFailed(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::StorageError(e) => write!(f, "Storage error: {}", e),
            ControllerError::AuthError(e) => write!(f, "Authentication error: {}", e),
            ControllerError::RegistrationError(e) => write!(f, "Registration error: {}", e),
            ControllerError::WebError(e) => write!(f, "Web error: {}", e),
            ControllerError::InitializationFailed(e) => write!(f, "Initialization failed: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::StorageError(err)
    }
}

impl From<AuthError> for ControllerError {
    fn from(err: AuthError) -> Self {
        ControllerError::AuthError(err)
    }
}

impl From<RegistrationError> for ControllerError {
    fn from(err: RegistrationError) -> Self {
        ControllerError::RegistrationError(err)
    }
}

impl From<WebError> for ControllerError {
    fn from(err: WebError) -> Self {
        ControllerError::WebError(err)
    }
}
