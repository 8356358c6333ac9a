//! Resolve a URL path against the route table

use anyhow::Result;

use crate::router::RouteTable;

/// Print how `path` resolves
pub fn run(path: &str) -> Result<()> {
    println!("{}", describe(&RouteTable::default(), path));
    Ok(())
}

/// Matched pattern and raw params, then the loaded route or why it failed
fn describe(routes: &RouteTable, path: &str) -> String {
    let Some((pattern, params)) = routes.match_path(path) else {
        return format!("404: no route matches {}", path);
    };
    let params = params
        .iter()
        .map(|(name, value)| format!(" {}={}", name, value))
        .collect::<String>();

    match routes.resolve(path) {
        Ok(route) => format!("{} -> {}{}", pattern, route, params),
        Err(e) => format!("404: {} -> {}{}", pattern, e, params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let routes = RouteTable::default();
        assert_eq!(describe(&routes, "/"), "/ -> home");
        assert_eq!(
            describe(&routes, "/posts/42/"),
            "/posts/:postId -> post #42 postId=42"
        );
    }

    #[test]
    fn test_describe_rejected_params() {
        let routes = RouteTable::default();
        assert_eq!(
            describe(&routes, "/posts/abc"),
            r#"404: /posts/:postId -> Invalid value "abc" for parameter postId postId=abc"#
        );
        assert_eq!(describe(&routes, "/about"), "404: no route matches /about");
    }
}
