use trellis::{MatchError, RouteTree};

macro_rules! match_tests {
    ($($name:ident {
        routes = $routes:expr,
        $( $path:literal :: $route:literal =>
            $( $(@$none:tt)? None )?
            $( $(@$some:tt)? { $( $key:literal => $val:literal ),* $(,)? } )?
        ),* $(,)?
    }),* $(,)?) => { $(
        #[test]
        fn $name() {
            let mut tree = RouteTree::new();

            for route in $routes {
                tree.insert(route, route.to_owned()).unwrap();
            }

            $(match tree.at($path) {
                Err(_) => {
                    $($( @$some )?
                        panic!("Expected value for route '{}'", $path)
                    )?
                }
                Ok(result) => {
                    $($( @$some )?
                        if result.value != $route {
                            panic!(
                                "Wrong value for route '{}'. Expected '{}', found '{}')",
                                $path, $route, result.value
                            );
                        }

                        let expected_params: Vec<(&str, &str)> = vec![$(($key, $val)),*];
                        let got_params = result.params.iter().collect::<Vec<_>>();

                        assert_eq!(
                            got_params, expected_params,
                            "Wrong params for route '{}'",
                            $path
                        );
                    )?

                    $($( @$none )?
                        panic!(
                            "Unexpected value for route '{}', got: {:?}",
                            $path,
                            result.params.iter().collect::<Vec<_>>()
                        );
                    )?
                }
            })*
        }
   )* };
}

match_tests! {
    backtracking {
        routes = [
            "/user/{id}/add",
            "/user/{id}/edit",
            "/user/{name}/add",
            "/user/{name}/del",
            "/user/10/",
            "/user/10",
            "/users/10/",
            "/users/{id}/",
            "/users/{id}/edit1",
            "/users/{id}/edit2",
            "/users/{name}/del",
            "/posts/list",
            "/page/{page:[0-9]+}",
            "/user/{id}/{name}/add",
            "/users/{id}",
            "/user/{id}/{name}/{title}/edit1",
            "/user/{id}/{name}/{title}/edit2",
            "/user/{id}/{name}/{title}/{files:*}/php",
            "/user/{id}/{name}/{title}/{file:*}",
            "/{id}",
        ],
        "/user/10/add" :: "/user/{id}/add" => { "id" => "10" },
        "/user/10/edit" :: "/user/{id}/edit" => { "id" => "10" },
        "/user/bob/del" :: "/user/{name}/del" => { "name" => "bob" },
        "/user/10" :: "/user/10" => {},
        "/user/10/" :: "/user/10" => {},
        "/users/10/" :: "/users/10/" => {},
        "/users/99/" :: "/users/{id}" => { "id" => "99" },
        "/users/99/edit2" :: "/users/{id}/edit2" => { "id" => "99" },
        "/users/bob/del" :: "/users/{name}/del" => { "name" => "bob" },
        "/user/1/bob/add" :: "/user/{id}/{name}/add" => { "id" => "1", "name" => "bob" },
        "/user/1/bob/title/edit1" :: "/user/{id}/{name}/{title}/edit1" => {
            "id" => "1", "name" => "bob", "title" => "title"
        },
        "/page/12" :: "/page/{page:[0-9]+}" => { "page" => "12" },
        "/page/abc" :: "" => None,
        "/posts/list" :: "/posts/list" => {},
        "/posts" :: "/{id}" => { "id" => "posts" },
        "/foo" :: "/{id}" => { "id" => "foo" },
        "/foo/bar" :: "" => None,
        "/user/12/foo/hello/css/style.css" :: "/user/{id}/{name}/{title}/{file:*}" => {
            "id" => "12", "name" => "foo", "title" => "hello", "file" => "css/style.css"
        },
        "/user/12/foo/hello/css/style.css/php" :: "/user/{id}/{name}/{title}/{files:*}/php" => {
            "id" => "12", "name" => "foo", "title" => "hello", "files" => "css/style.css"
        },
        "/user/12/foo/hello/php" :: "/user/{id}/{name}/{title}/{file:*}" => {
            "id" => "12", "name" => "foo", "title" => "hello", "file" => "php"
        },
        "/user/12/foo/hello/edit1" :: "/user/{id}/{name}/{title}/edit1" => {
            "id" => "12", "name" => "foo", "title" => "hello"
        },
    },
    param_and_catch_all {
        routes = [
            "/user/{uid:[0-9]+}/edit/{pid}",
            "/src/{file:*}",
        ],
        "/user/12/edit/3" :: "/user/{uid:[0-9]+}/edit/{pid}" => { "uid" => "12", "pid" => "3" },
        "/user/foo/edit/3" :: "" => None,
        "/src/public/css/style.css" :: "/src/{file:*}" => { "file" => "public/css/style.css" },
        "/src/style.css/" :: "/src/{file:*}" => { "file" => "style.css" },
        "/src/" :: "" => None,
        "/src" :: "" => None,
    },
    mid_pattern_catch_all {
        routes = [
            "/src/{path:*}/raw",
            "/src/{path:*}/raw/{rev}",
            "/src/{path:*}/blame/{line:[0-9]+}",
        ],
        "/src/lib.rs/raw" :: "/src/{path:*}/raw" => { "path" => "lib.rs" },
        "/src/tree/node.rs/raw" :: "/src/{path:*}/raw" => { "path" => "tree/node.rs" },
        "/src/raw/raw" :: "/src/{path:*}/raw" => { "path" => "raw" },
        "/src/a/raw/b/raw" :: "/src/{path:*}/raw" => { "path" => "a/raw/b" },
        "/src/a/raw/b" :: "/src/{path:*}/raw/{rev}" => { "path" => "a", "rev" => "b" },
        "/src/a/b/blame/10" :: "/src/{path:*}/blame/{line:[0-9]+}" => {
            "path" => "a/b", "line" => "10"
        },
        "/src/a/b/blame/x" :: "" => None,
        "/src/raw" :: "" => None,
        "/src/a/b" :: "" => None,
    },
    constraints {
        routes = [
            "/year/{year:[0-9]{4}}",
            "/year/{slug}",
            "/kind/{kind:post|page}/{id:[0-9]+}",
            "/kind/{other}/{id}",
            "/empty/{id:}",
        ],
        "/year/2024" :: "/year/{year:[0-9]{4}}" => { "year" => "2024" },
        "/year/24" :: "/year/{slug}" => { "slug" => "24" },
        "/year/2024a" :: "/year/{slug}" => { "slug" => "2024a" },
        "/kind/post/1" :: "/kind/{kind:post|page}/{id:[0-9]+}" => { "kind" => "post", "id" => "1" },
        "/kind/page/x" :: "/kind/{other}/{id}" => { "other" => "page", "id" => "x" },
        "/kind/posts/1" :: "/kind/{other}/{id}" => { "other" => "posts", "id" => "1" },
        "/empty/5" :: "/empty/{id:}" => { "id" => "5" },
        "/empty/abc" :: "/empty/{id:}" => { "id" => "abc" },
    },
    root_and_trailing_slashes {
        routes = [
            "/",
            "/cmd/{tool}/",
            "/cmd/{tool}/{sub}",
            "/search/",
            "/search/{query}",
        ],
        "/" :: "/" => {},
        "" :: "/" => {},
        "/cmd/test" :: "/cmd/{tool}/" => { "tool" => "test" },
        "/cmd/test/" :: "/cmd/{tool}/" => { "tool" => "test" },
        "/cmd/test/3" :: "/cmd/{tool}/{sub}" => { "tool" => "test", "sub" => "3" },
        "/search/" :: "/search/" => {},
        "/search/someth!ng+in+ünìcodé" :: "/search/{query}" => { "query" => "someth!ng+in+ünìcodé" },
        "/search//" :: "" => None,
        "/cmd//3" :: "" => None,
        "//cmd/test" :: "" => None,
        "cmd/test" :: "" => None,
    },
    many_params {
        routes = [
            "/{a}/{b}/{c}/{d}/{e}",
        ],
        "/1/2/3/4/5" :: "/{a}/{b}/{c}/{d}/{e}" => {
            "a" => "1", "b" => "2", "c" => "3", "d" => "4", "e" => "5"
        },
        "/1/2/3/4" :: "" => None,
        "/1/2/3/4/5/6" :: "" => None,
    },
}

#[test]
fn overwrite_keeps_latest_value() {
    let mut tree = RouteTree::new();
    tree.insert("/users/{id}", "first").unwrap();
    tree.insert("/users/{id}/", "second").unwrap();

    let matched = tree.at("/users/1").unwrap();
    assert_eq!(*matched.value, "second");
    assert_eq!(matched.params.get("id"), Some("1"));
}

#[test]
fn not_found() {
    let mut tree = RouteTree::new();
    tree.insert("/home", ()).unwrap();

    assert_eq!(tree.at("/away").unwrap_err(), MatchError::NotFound);
    assert_eq!(RouteTree::<()>::new().at("/").unwrap_err(), MatchError::NotFound);
}

#[test]
fn find_reuses_captures() {
    let mut tree = RouteTree::new();
    tree.insert("/user/{id}/{name}", 1).unwrap();
    tree.insert("/static/{file:*}", 2).unwrap();

    let mut captures = Vec::new();
    let path = "/user/12/bob";
    assert_eq!(tree.find(path, &mut captures), Some(&1));
    assert_eq!(&path[captures[0].clone()], "12");
    assert_eq!(&path[captures[1].clone()], "bob");

    let path = "/static/css/app.css";
    assert_eq!(tree.find(path, &mut captures), Some(&2));
    assert_eq!(captures.len(), 1);
    assert_eq!(&path[captures[0].clone()], "css/app.css");

    assert_eq!(tree.find("/nope", &mut captures), None);
}
