//! Process launch artifacts: JVM security options and the start command

use crate::auth::SUPER_USER;
use crate::paths::{ConfigPaths, SERVER_ENTRYPOINT};

pub const JVM_OPTS_VAR: &str = "KAFKA_OPTS";

/// JVM system properties enabling SASL with the generated JAAS file
pub fn jvm_security_options(paths: &ConfigPaths) -> Vec<String> {
    vec![
        "-Dzookeeper.requireClientAuthScheme=sasl".to_string(),
        format!("-Dzookeeper.superUser={}", SUPER_USER),
        format!("-Djava.security.auth.login.config={}", paths.jaas.display()),
        "-Djavax.net.debug=ssl:handshake:verbose:keymanager:trustmanager".to_string(),
    ]
}

/// Line for the environment file
pub fn environment_line(paths: &ConfigPaths) -> String {
    format!("{}='{}'", JVM_OPTS_VAR, jvm_security_options(paths).join(" "))
}

pub fn start_command(paths: &ConfigPaths) -> String {
    format!("{} {}", SERVER_ENTRYPOINT, paths.properties.display())
}
