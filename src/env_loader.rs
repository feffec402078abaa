use std::env;
use std::path::PathBuf;

fn fallback_dotenv_path(
    msgcat_home: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    let base = msgcat_home.or(home_dir)?;
    Some(base.join(".msgcat/.env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os("MSGCAT_HOME").map(PathBuf::from),
        dirs::home_dir(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::fallback_dotenv_path;
    use std::path::PathBuf;

    #[test]
    fn fallback_prefers_msgcat_home_over_home_dir() {
        let got = fallback_dotenv_path(
            Some(PathBuf::from("/workspace")),
            Some(PathBuf::from("/home/alice")),
        );

        let want = Some(PathBuf::from("/workspace/.msgcat/.env"));
        assert_eq!(got, want);
    }

    #[test]
    fn fallback_uses_home_when_msgcat_home_unset() {
        let got = fallback_dotenv_path(None, Some(PathBuf::from("/home/alice")));
        let want = Some(PathBuf::from("/home/alice/.msgcat/.env"));
        assert_eq!(got, want);
    }
}
