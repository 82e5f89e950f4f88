use trellis::{InsertError, RouteTree};

struct InsertTest(Vec<(&'static str, Result<(), InsertError>)>);

impl InsertTest {
    fn run(self) {
        let mut tree = RouteTree::new();
        for (route, expected) in self.0 {
            let got = tree.insert(route, route.to_owned());
            assert_eq!(got, expected, "{route}");
        }
    }
}

fn invalid_path(path: &str) -> InsertError {
    InsertError::InvalidPath { path: path.into() }
}

#[test]
fn overlapping_routes() {
    InsertTest(vec![
        ("/cmd/{tool}/{sub}", Ok(())),
        ("/cmd/vet", Ok(())),
        ("/foo/bar", Ok(())),
        ("/foo/{name}", Ok(())),
        ("/foo/{names}", Ok(())),
        ("/cmd/{path:*}", Ok(())),
        ("/cmd/{xxx}/names", Ok(())),
        ("/cmd/{tool}/{xxx}/foo", Ok(())),
        ("/src/{filepath:*}", Ok(())),
        ("/src/{file}", Ok(())),
        ("/src/static.json", Ok(())),
        ("/src/", Ok(())),
        ("/src/foo/bar", Ok(())),
        ("/search/{query}", Ok(())),
        ("/search/valid", Ok(())),
        ("/id/{id}", Ok(())),
        ("/id/{id:[0-9]+}", Ok(())),
        ("/{id}", Ok(())),
        ("/{path:*}", Ok(())),
    ])
    .run()
}

#[test]
fn duplicates_replace() {
    InsertTest(vec![
        ("/", Ok(())),
        ("/", Ok(())),
        ("/doc/", Ok(())),
        ("/doc", Ok(())),
        ("/src/{filepath:*}", Ok(())),
        ("/src/{filepath:*}", Ok(())),
        ("/search/{query}", Ok(())),
        ("/search/{query}", Ok(())),
    ])
    .run()
}

#[test]
fn catch_all_placement() {
    InsertTest(vec![
        ("/src/{filepath:*}/x", Ok(())),
        ("/src/{filepath:*}/x/y", Ok(())),
        ("/src/{filepath:*}/{x}", Err(InsertError::InvalidCatchAll)),
        ("/src/{filepath:*}/{x:[a-z]+}", Err(InsertError::InvalidCatchAll)),
        ("/src/{a:*}/{b:*}", Err(InsertError::MultipleCatchAll)),
        ("/src/{a:*}/x/{b:*}", Err(InsertError::MultipleCatchAll)),
        ("/{path:*}", Ok(())),
    ])
    .run()
}

#[test]
fn unnamed_param() {
    InsertTest(vec![
        ("/{}", Err(InsertError::UnnamedParam)),
        ("/cmd/{}/", Err(InsertError::UnnamedParam)),
        ("/src/{:*}", Err(InsertError::UnnamedParam)),
        ("/page/{:[0-9]+}", Err(InsertError::UnnamedParam)),
    ])
    .run()
}

#[test]
fn invalid_paths() {
    InsertTest(vec![
        ("", Err(invalid_path(""))),
        ("users", Err(invalid_path("users"))),
        ("/users//{id}", Err(invalid_path("/users//{id}"))),
        ("//", Err(invalid_path("//"))),
        ("/users/", Ok(())),
    ])
    .run()
}

#[test]
fn invalid_constraint() {
    let mut tree = RouteTree::new();
    let err = tree.insert("/page/{page:[0-9+}", ()).unwrap_err();

    match &err {
        InsertError::InvalidConstraint { name, .. } => assert_eq!(name, "page"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().starts_with("invalid constraint for parameter 'page'"));
    assert!(std::error::Error::source(&err).is_some());

    assert!(tree.at("/page/1").is_err());
}

#[test]
fn braces_without_param_are_literals() {
    let mut tree = RouteTree::new();
    tree.insert("/x{y", 1).unwrap();
    tree.insert("/{y", 2).unwrap();

    assert_eq!(*tree.at("/x{y").unwrap().value, 1);
    assert_eq!(*tree.at("/{y").unwrap().value, 2);
}
