/**
Prints the calling function together with the line and the statement being
processed when tracing is enabled for that line.  `$ts` must have a
`tracing: TracingConfig` field and `line()` and `trace_subject()` methods.
 */
#[macro_export]
macro_rules! trace {
    ($ts:expr) => {
        if $ts.tracing.includes($ts.line() as usize) {
            println!(
                "{} <- L{}: {}",
                function_name!(),
                $ts.line(),
                $ts.trace_subject()
            )
        }
    };
}
