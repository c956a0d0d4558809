//! Runtime support module.
//!
//! Defines the print entry points on top of libc's `printf`/`fflush` and the
//! native `main`, which runs the initialization function and then the
//! program's entry function when there is one. The module is built in the
//! same context and linked into the program module.

use inkwell::{
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    types::BasicTypeEnum,
    AddressSpace,
};

use crate::{
    errors::errors::CodegenError,
    ir::builder::{ENTRY_SYMBOL, INIT_FUNCTION},
};

use super::compiler::{Compiler, PRINT_BYTE, PRINT_FLOAT, PRINT_INT};

struct PrintFunction<'a> {
    name: &'static str,
    format: &'static str,
    param: BasicTypeEnum<'a>,
    flush: bool,
}

fn define_print<'a>(
    context: &'a Context,
    module: &Module<'a>,
    builder: &Builder<'a>,
    print: PrintFunction<'a>,
) -> Result<(), CodegenError> {
    let printf = module
        .get_function("printf")
        .ok_or_else(|| CodegenError::UnknownFunction {
            name: "printf".to_string(),
        })?;
    let fflush = module
        .get_function("fflush")
        .ok_or_else(|| CodegenError::UnknownFunction {
            name: "fflush".to_string(),
        })?;

    let function = module.add_function(
        print.name,
        context.void_type().fn_type(&[print.param.into()], false),
        Some(Linkage::External),
    );
    builder.position_at_end(context.append_basic_block(function, "entry"));

    let value = function
        .get_first_param()
        .ok_or_else(|| CodegenError::MissingParameter {
            function: print.name.to_string(),
            index: 0,
        })?;
    // Varargs promote anything narrower than int
    let value = if value.is_int_value() {
        builder
            .build_int_z_extend(value.into_int_value(), context.i32_type(), "value")?
            .into()
    } else {
        value
    };

    let format = builder.build_global_string_ptr(print.format, &format!("{}_format", print.name))?;
    builder.build_call(printf, &[format.as_pointer_value().into(), value.into()], "")?;

    if print.flush {
        let stdout_all = context
            .i8_type()
            .ptr_type(AddressSpace::default())
            .const_null();
        builder.build_call(fflush, &[stdout_all.into()], "")?;
    }

    builder.build_return(None)?;
    Ok(())
}

/// Builds the runtime module. `has_entry` tells whether the program defines
/// an entry function for the native `main` to call.
pub fn build_runtime(context: &Context, has_entry: bool) -> Result<Module<'_>, CodegenError> {
    let module = context.create_module("runtime");
    let builder = context.create_builder();

    let i32_type = context.i32_type();
    let i8_ptr_type = context.i8_type().ptr_type(AddressSpace::default());

    module.add_function(
        "printf",
        i32_type.fn_type(&[i8_ptr_type.into()], true),
        Some(Linkage::External),
    );
    module.add_function(
        "fflush",
        i32_type.fn_type(&[i8_ptr_type.into()], false),
        Some(Linkage::External),
    );

    let prints = [
        PrintFunction {
            name: PRINT_INT,
            format: "%i\n",
            param: i32_type.into(),
            flush: false,
        },
        PrintFunction {
            name: PRINT_FLOAT,
            format: "%f\n",
            param: context.f64_type().into(),
            flush: false,
        },
        PrintFunction {
            name: PRINT_BYTE,
            format: "%c",
            param: context.i8_type().into(),
            flush: true,
        },
    ];
    for print in prints {
        define_print(context, &module, &builder, print)?;
    }

    let program_fn_type = i32_type.fn_type(&[], false);
    let init = module.add_function(INIT_FUNCTION, program_fn_type, Some(Linkage::External));

    let main = module.add_function("main", program_fn_type, Some(Linkage::External));
    builder.position_at_end(context.append_basic_block(main, "entry"));
    builder.build_call(init, &[], "init")?;

    if has_entry {
        let entry = module.add_function(ENTRY_SYMBOL, program_fn_type, Some(Linkage::External));
        let status = builder
            .build_call(entry, &[], "status")?
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodegenError::VoidCall {
                name: ENTRY_SYMBOL.to_string(),
            })?;
        builder.build_return(Some(&status))?;
    } else {
        builder.build_return(Some(&i32_type.const_zero()))?;
    }

    Ok(module)
}

/// Links the runtime into `compiler`'s module, after which the module is a
/// complete program with a native `main`.
pub fn link_runtime(compiler: &Compiler<'_>) -> Result<(), CodegenError> {
    let has_entry = compiler.module.get_function(ENTRY_SYMBOL).is_some();
    tracing::debug!(has_entry, "linking runtime");

    let runtime = build_runtime(compiler.context, has_entry)?;
    compiler
        .module
        .link_in_module(runtime)
        .map_err(|message| CodegenError::Link(message.to_string()))?;

    compiler.verify()
}
