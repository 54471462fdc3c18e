use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, GenericArgument, Ident, ItemFn, PathArguments,
    Signature, Type,
};

/// Turn a function into a test, set up logging, and inject the example election.
///
/// Injectable dependencies are the election itself (`ExampleTally` or
/// `ElectionTally<..>`), its `ManualClock`, and its `Arc<RecordingSink>`, in any
/// order. The optional argument picks where the clock starts: `open` or
/// `closed`; without it the election has not started yet.
#[proc_macro_attribute]
pub fn tally_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Work out what to pass in, rejecting invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Pick the starting phase.
    let phase = match parse_macro_input!(args as Option<Ident>) {
        None => format_ident!("NotStarted"),
        Some(arg) if arg == "open" => format_ident!("Open"),
        Some(arg) if arg == "closed" => format_ident!("Closed"),
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `open`, `closed`, or nothing")
                .into_compile_error()
                .into();
        }
    };

    // Rename the inner function so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_inner", name);
    item_fn.sig.ident = new_name.clone();

    quote! {
        #[test]
        fn #name() {
            ::log4rs_test_utils::test_logging::init_logging_once_for(
                ["election_tally"],
                None,
                None,
            );

            /// The test itself.
            #item_fn

            #[allow(unused_variables)]
            let (tally, clock, events) = crate::model::election::ElectionTally::example(
                crate::model::election::ElectionPhase::#phase,
            );

            #new_name(#(#test_args),*);
        }
    }
    .into()
}

/// Ensure the wrapped test is synchronous and map each parameter to an injected value.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if let Some(asyncness) = sig.asyncness {
        return Err(syn::Error::new(asyncness.span(), "Test must not be `async`"));
    }

    let mut has_tally = false;
    let mut has_clock = false;
    let mut has_events = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Type::Path(type_path) = &*pat_type.ty {
                // Valid as the last path segment for any type is itself.
                if let Some(segment) = type_path.path.segments.last() {
                    let (seen, arg, what) = if segment.ident == "ExampleTally"
                        || segment.ident == "ElectionTally"
                    {
                        (&mut has_tally, quote! { tally }, "election")
                    } else if segment.ident == "ManualClock" {
                        (&mut has_clock, quote! { clock }, "`ManualClock`")
                    } else if segment.ident == "Arc" && is_recording_sink(&segment.arguments) {
                        (&mut has_events, quote! { events }, "`Arc<RecordingSink>`")
                    } else {
                        return Err(unexpected(input));
                    };
                    if *seen {
                        return Err(syn::Error::new(
                            input.span(),
                            format!("Test cannot accept more than one {what}"),
                        ));
                    }
                    *seen = true;
                    args.push(arg);
                    continue;
                }
            }
        }

        return Err(unexpected(input));
    }

    Ok(args)
}

/// Is this the `<RecordingSink>` of an `Arc<RecordingSink>`?
fn is_recording_sink(arguments: &PathArguments) -> bool {
    if let PathArguments::AngleBracketed(generics) = arguments {
        if let Some(GenericArgument::Type(Type::Path(inner))) = generics.args.first() {
            return inner
                .path
                .segments
                .last()
                .map_or(false, |segment| segment.ident == "RecordingSink");
        }
    }
    false
}

fn unexpected(input: &FnArg) -> syn::Error {
    syn::Error::new(
        input.span(),
        "Expected one of `tally: ExampleTally`, `clock: ManualClock` or `events: Arc<RecordingSink>`",
    )
}
