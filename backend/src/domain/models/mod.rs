pub mod categoria;
pub mod cliente;
pub mod registro;
pub mod usuario;

pub use categoria::{CategoriaMap, DEFAULT_CATEGORIA_EMOJI};
pub use cliente::{Bicicleta, Cliente};
pub use registro::Registro;
pub use usuario::{Permissoes, Usuario};
