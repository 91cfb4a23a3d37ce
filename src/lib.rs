pub mod ast;
pub mod codec;
pub mod connect;
pub mod evaluator;
pub mod facade;
pub mod path;
pub mod registry;
pub mod value;
pub mod wire;

pub use ast::{RenameRule, Transformation};
pub use codec::{Codec, CodecError, CsvCodec, JsonCodec, YamlCodec};
pub use connect::{
    ConnectorError, ConstructionError, DefinitionStore, Format, MapError, Mapper, MemorySink,
    MemorySource, MemoryStore, Sink, Source, StoredDefinition,
};
pub use evaluator::{EvalError, Evaluator};
pub use facade::{TransformError, Transformer};
pub use path::{PathError, Segment};
pub use registry::{FunctionRegistry, NativeFn};
pub use value::Value;
pub use wire::WireError;
