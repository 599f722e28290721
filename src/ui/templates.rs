use minijinja::Environment;

/// Build the template environment. Templates are compiled into the binary;
/// `.html` templates auto-escape.
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("dashboard.html", include_str!("../../templates/dashboard.html"))?;
    env.add_template("table.html", include_str!("../../templates/table.html"))?;
    Ok(env)
}

pub const STYLESHEET: &str = include_str!("../../assets/dashboard.css");
pub const SCRIPT: &str = include_str!("../../assets/dashboard.js");
