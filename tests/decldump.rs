use crate::build::{dump, dump_failure, dump_json, dump_to_file};

mod build;

#[test]
fn test_dump_globals() {
    let out = dump(
        &[],
        "
        long a;
        static unsigned short b;
        char *p;
    ",
    );
    assert_eq!(
        out,
        "a: auto long\n\
         b: static unsigned short\n\
         p: auto char *\n"
    );
}

#[test]
fn test_dump_initializers() {
    let out = dump(
        &[],
        "
        long x = 5 + 3;
        unsigned long mask = ~0u;
    ",
    );
    assert_eq!(
        out,
        "x: auto long = 8\n\
         mask: auto unsigned long = 4294967295\n"
    );
}

#[test]
fn test_dump_verbose() {
    let out = dump(&["-v"], "long a;");
    assert_eq!(out, "a: auto long; size 4, align 4\n");
}

#[test]
fn test_dump_typedef_and_struct() {
    let out = dump(
        &[],
        "
        typedef struct { long x; char c; } pair_t;
        pair_t p;
    ",
    );
    assert_eq!(
        out,
        "pair_t: typedef struct { x: long; c: char; }\n\
         p: auto struct { x: long; c: char; }\n"
    );
}

#[test]
fn test_dump_functions() {
    let out = dump(
        &[],
        "
        void f(long n, char *s);
        long print(const char *fmt, ...);
    ",
    );
    assert_eq!(
        out,
        "f: auto (fn (long, char *) -> void)\n\
         print: auto (fn (const char *, ...) -> long)\n"
    );
}

#[test]
fn test_dump_json() {
    let v = dump_json(
        "
        enum { N = 3 };
        long arr[N];
        static char c = 'x';
    ",
    );
    assert_eq!(v.as_array().unwrap().len(), 2);
    assert_eq!(v[0]["name"], "arr");
    assert_eq!(v[0]["storageClass"], "auto");
    assert_eq!(v[0]["type"], "long [3]");
    assert_eq!(v[0]["size"], 12);
    assert_eq!(v[0]["align"], 4);
    assert!(v[0].get("value").is_none());
    assert_eq!(v[1]["name"], "c");
    assert_eq!(v[1]["storageClass"], "static");
    assert_eq!(v[1]["size"], 1);
    assert_eq!(v[1]["value"], 120);
}

#[test]
fn test_dump_to_file() {
    let out = dump_to_file(&[], "const long k;");
    assert_eq!(out, "k: auto const long\n");
}

#[test]
fn test_dump_error_exit() {
    dump_failure("long a[x];");
}
