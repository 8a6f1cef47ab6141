// Shared harness for the end-to-end cases.
//
// `output:` cases expect the exact success text, `error:` cases the kind of
// rejection.

#[macro_export]
macro_rules! test_case {
    ($name:ident, input: $input:expr, output: $output:expr $(,)?) => {
        #[test]
        fn $name() {
            let result = mathbox::execute_math_function($input).map_err(|e| e.to_string());
            pretty_assertions::assert_eq!(result, Ok($output.to_string()));
        }
    };
    ($name:ident, input: $input:expr, error: $kind:ident $(,)?) => {
        #[test]
        fn $name() {
            let result = mathbox::execute_math_function($input).map_err(|e| e.kind());
            pretty_assertions::assert_eq!(result, Err(mathbox::ErrorKind::$kind));
        }
    };
}
