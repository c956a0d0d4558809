//! Main compiler module.
//!
//! This module contains the core Compiler structure and drives the
//! translation of an IR program into an LLVM module: runtime declarations,
//! global cells, function prototypes and finally the function bodies.

use std::{collections::HashMap, path::Path};

use inkwell::{
    attributes::{Attribute, AttributeLoc},
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine},
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType},
    values::{FunctionValue, GlobalValue},
    AddressSpace, OptimizationLevel,
};

use crate::{
    errors::errors::CodegenError,
    ir::instruction::{IrFunction, IrProgram, PhysicalType},
};

use super::function::FunctionEmitter;

/// Runtime entry points the program module declares, one per physical type.
pub const PRINT_INT: &str = "_print_int";
pub const PRINT_FLOAT: &str = "_print_float";
pub const PRINT_BYTE: &str = "_print_byte";

pub fn print_function_name(ty: PhysicalType) -> &'static str {
    match ty {
        PhysicalType::Int => PRINT_INT,
        PhysicalType::Float => PRINT_FLOAT,
        PhysicalType::Byte => PRINT_BYTE,
    }
}

/// Prefix of the LLVM symbol backing a global cell.
///
/// Variables and functions live in separate namespaces in the language but
/// share one symbol table in the module, alongside the runtime's symbols.
pub const GLOBAL_PREFIX: &str = "__pulse_g_";

pub fn global_symbol(name: &str) -> String {
    format!("{}{}", GLOBAL_PREFIX, name)
}

/// The structure that holds the state of LLVM code generation.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the LLVM context
pub struct Compiler<'a> {
    /// Reference to the LLVM context
    pub context: &'a Context,
    /// The LLVM module being built
    pub module: Module<'a>,
    /// The LLVM IR builder
    pub builder: Builder<'a>,
    /// Module-level cells, by source name
    pub globals: HashMap<String, GlobalValue<'a>>,
}

impl<'a> Compiler<'a> {
    /// Creates a new Compiler instance.
    ///
    /// # Arguments
    ///
    /// * `context` - The LLVM context to use
    /// * `module_name` - Name of the LLVM module to create
    ///
    /// # Returns
    ///
    /// A new Compiler instance with an empty module and no globals.
    pub fn new(context: &'a Context, module_name: &str) -> Self {
        Compiler {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            globals: HashMap::new(),
        }
    }

    /// Maps a physical type to its LLVM representation.
    ///
    /// # Returns
    ///
    /// `i32` for `I`, `double` for `F` and `i8` for `B`.
    pub fn convert_type(&self, ty: PhysicalType) -> BasicTypeEnum<'a> {
        match ty {
            PhysicalType::Int => self.context.i32_type().into(),
            PhysicalType::Float => self.context.f64_type().into(),
            PhysicalType::Byte => self.context.i8_type().into(),
        }
    }

    fn function_type(&self, function: &IrFunction) -> FunctionType<'a> {
        let params: Vec<BasicMetadataTypeEnum<'a>> = function
            .params
            .iter()
            .map(|(_, ty)| self.convert_type(*ty).into())
            .collect();

        self.convert_type(function.return_type)
            .fn_type(&params, false)
    }

    /// Declares the three print entry points. Their bodies live in the
    /// runtime module.
    fn create_external_functions(&self) {
        for ty in [PhysicalType::Int, PhysicalType::Float, PhysicalType::Byte] {
            let function_type = self
                .context
                .void_type()
                .fn_type(&[self.convert_type(ty).into()], false);

            self.module.add_function(
                print_function_name(ty),
                function_type,
                Some(Linkage::External),
            );
        }
    }

    /// Emits one zero-initialized cell per global of the program.
    ///
    /// # Arguments
    ///
    /// * `program` - The IR program whose `VAR` instructions name the globals
    ///
    /// The cells are keyed by source name in `self.globals`; the LLVM symbol
    /// carries [`GLOBAL_PREFIX`].
    fn create_globals(&mut self, program: &IrProgram) {
        for (name, ty) in program.globals() {
            if self.globals.contains_key(name) {
                continue;
            }

            let llvm_type = self.convert_type(ty);
            let global = self
                .module
                .add_global(llvm_type, Some(AddressSpace::default()), &global_symbol(name));
            global.set_initializer(&llvm_type.const_zero());

            tracing::trace!(name, ty = %ty, "declared global");
            self.globals.insert(name.to_string(), global);
        }
    }

    /// Adds a prototype for every function up front so calls can refer to
    /// functions defined later in the module.
    fn create_function_protos(&self, program: &IrProgram) {
        for function in &program.functions {
            let value = self.module.add_function(
                &function.name,
                self.function_type(function),
                Some(Linkage::External),
            );
            self.add_function_attributes(value);
        }
    }

    fn add_function_attributes(&self, function: FunctionValue<'a>) {
        let attributes = [
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("uwtable"), 0),
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("nounwind"), 0),
        ];

        for attribute in attributes.iter() {
            function.add_attribute(AttributeLoc::Function, *attribute);
        }
    }

    /// Looks up a function declared or defined in the module.
    ///
    /// # Arguments
    ///
    /// * `name` - The LLVM symbol of the function
    ///
    /// # Returns
    ///
    /// The function value, or `UnknownFunction` when the module has no such
    /// symbol.
    pub fn get_function(&self, name: &str) -> Result<FunctionValue<'a>, CodegenError> {
        self.module
            .get_function(name)
            .ok_or_else(|| CodegenError::UnknownFunction {
                name: name.to_string(),
            })
    }

    /// Generates the whole module from `program`.
    fn gen(&mut self, program: &IrProgram) -> Result<(), CodegenError> {
        self.create_external_functions();
        self.create_globals(program);
        self.create_function_protos(program);

        for function in &program.functions {
            tracing::debug!(function = %function.name, "emitting function");
            FunctionEmitter::new(self, function)?.emit()?;
        }

        Ok(())
    }

    pub fn verify(&self) -> Result<(), CodegenError> {
        self.module
            .verify()
            .map_err(|message| CodegenError::Verify(message.to_string()))
    }

    /// Sets the module's triple and data layout to the host's.
    pub fn configure_target(&self) -> Result<(), CodegenError> {
        Target::initialize_all(&InitializationConfig::default());

        let target_triple = TargetMachine::get_default_triple();
        let target = Target::from_triple(&target_triple)
            .map_err(|message| CodegenError::Target(message.to_string()))?;
        let target_machine = target
            .create_target_machine(
                &target_triple,
                "generic",
                "",
                OptimizationLevel::Default,
                RelocMode::PIC,
                CodeModel::Default,
            )
            .ok_or_else(|| {
                CodegenError::Target(format!(
                    "no target machine for {}",
                    target_triple.as_str().to_string_lossy()
                ))
            })?;

        self.module.set_triple(&target_triple);
        self.module
            .set_data_layout(&target_machine.get_target_data().get_data_layout());

        Ok(())
    }

    pub fn print_to_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Saves the current LLVM module to a file as text.
    ///
    /// # Arguments
    ///
    /// * `output_file` - Path of the `.ll` file to write
    pub fn save_module_to_file(&self, output_file: &Path) -> Result<(), CodegenError> {
        self.module
            .print_to_file(output_file)
            .map_err(|message| CodegenError::Write {
                path: output_file.display().to_string(),
                message: message.to_string(),
            })
    }
}

/// Emits `program` into a fresh module named `module_name` and verifies it.
///
/// # Arguments
///
/// * `program` - The lowered program, initialization function first
/// * `module_name` - Name of the LLVM module
/// * `context` - The LLVM context owning the module
///
/// # Returns
///
/// The compiler holding the verified module, ready to be linked against the
/// runtime or written out.
pub fn compile<'a>(
    program: &IrProgram,
    module_name: &str,
    context: &'a Context,
) -> Result<Compiler<'a>, CodegenError> {
    let mut compiler = Compiler::new(context, module_name);

    compiler.gen(program)?;
    compiler.verify()?;

    Ok(compiler)
}
