//! Loader trait and the ordered set of available loaders.

use imgload_image::{Arch, BaseRelative, FormatDescriptor, FormatKind, LoadContext, LoadedImage};
use tracing::{debug, info};

use crate::{Error, Result};

/// A binary format that can be sniffed and loaded.
pub trait Loader: Send + Sync {
    /// Format handled by this loader.
    fn kind(&self) -> FormatKind;

    /// Display name.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Cheap, read-only check that `data` is this format.
    ///
    /// # Errors
    ///
    /// The format's rejection, wrapped in [`Error`].
    fn query(&self, data: &[u8], ctx: &dyn LoadContext) -> Result<FormatDescriptor>;

    /// Build the image. Only call after a successful [`Loader::query`].
    ///
    /// # Errors
    ///
    /// The format's load failure, wrapped in [`Error`].
    fn load(&self, data: &[u8], ctx: &dyn LoadContext) -> Result<LoadedImage>;
}

/// `MobiCore` Load Format v2.
#[derive(Debug, Default, Clone, Copy)]
pub struct MclfLoader;

impl Loader for MclfLoader {
    fn kind(&self) -> FormatKind {
        FormatKind::Mclf
    }

    fn name(&self) -> &'static str {
        "MCLF"
    }

    fn description(&self) -> &'static str {
        "Load MobiCore Load Format (MCLF) v2 binaries"
    }

    fn query(&self, data: &[u8], _ctx: &dyn LoadContext) -> Result<FormatDescriptor> {
        Ok(imgload_mclf::query(data)?)
    }

    fn load(&self, data: &[u8], ctx: &dyn LoadContext) -> Result<LoadedImage> {
        Ok(imgload_mclf::load(data, ctx)?)
    }
}

/// Motorola S-Record.
#[derive(Debug, Default, Clone, Copy)]
pub struct SrecLoader;

impl Loader for SrecLoader {
    fn kind(&self) -> FormatKind {
        FormatKind::Srec
    }

    fn name(&self) -> &'static str {
        "SREC"
    }

    fn description(&self) -> &'static str {
        "Load Motorola S-Record (SREC) binaries"
    }

    fn query(&self, data: &[u8], ctx: &dyn LoadContext) -> Result<FormatDescriptor> {
        Ok(imgload_srec::query(data, ctx)?)
    }

    fn load(&self, data: &[u8], ctx: &dyn LoadContext) -> Result<LoadedImage> {
        Ok(imgload_srec::load(data, ctx)?)
    }
}

/// Caller choices for [`LoaderRegistry::load`].
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Only try this format.
    pub format: Option<FormatKind>,
    /// Answer to the architecture prompt of formats that do not encode one.
    pub arch: Option<Arch>,
}

impl LoadOptions {
    /// Context used while sniffing: no relocation, preselected architecture.
    #[must_use]
    pub fn sniff_context(&self) -> BaseRelative {
        let ctx = BaseRelative::new(0);
        match self.arch {
            Some(arch) => ctx.with_choice(arch.name()),
            None => ctx,
        }
    }
}

/// A loader that accepted the input, with its descriptor.
pub struct Sniffed<'r> {
    pub loader: &'r dyn Loader,
    pub descriptor: FormatDescriptor,
}

/// Result of a full load.
#[derive(Clone, Debug)]
pub struct Loaded {
    pub descriptor: FormatDescriptor,
    pub image: LoadedImage,
}

/// Loaders tried in order. MCLF comes first since its check is a fixed magic.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn Loader>>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self {
            loaders: vec![Box::new(MclfLoader), Box::new(SrecLoader)],
        }
    }
}

impl LoaderRegistry {
    pub fn loaders(&self) -> impl Iterator<Item = &dyn Loader> {
        self.loaders.iter().map(|loader| &**loader)
    }

    #[must_use]
    pub fn find(&self, kind: FormatKind) -> Option<&dyn Loader> {
        self.loaders().find(|loader| loader.kind() == kind)
    }

    /// Return the first loader that accepts `data`.
    ///
    /// A loader that rejects the input is logged and skipped.
    ///
    /// # Errors
    ///
    /// [`Error::Unrecognized`] if no loader accepts.
    pub fn sniff(&self, data: &[u8], ctx: &dyn LoadContext) -> Result<Sniffed<'_>> {
        for loader in self.loaders() {
            match loader.query(data, ctx) {
                Ok(descriptor) => {
                    debug!(loader = loader.name(), title = %descriptor.title, "recognized");
                    return Ok(Sniffed { loader, descriptor });
                }
                Err(e) => {
                    debug!(loader = loader.name(), error = %e, "not recognized");
                }
            }
        }
        Err(Error::Unrecognized)
    }

    /// Sniff with one specific loader, keeping its error.
    ///
    /// # Errors
    ///
    /// The loader's own rejection, or [`Error::Unrecognized`] if no loader
    /// handles `kind`.
    pub fn sniff_as(
        &self,
        kind: FormatKind,
        data: &[u8],
        ctx: &dyn LoadContext,
    ) -> Result<Sniffed<'_>> {
        let loader = self.find(kind).ok_or(Error::Unrecognized)?;
        let descriptor = loader.query(data, ctx)?;
        Ok(Sniffed { loader, descriptor })
    }

    /// Sniff, then load relative to the sniffed base address.
    ///
    /// # Errors
    ///
    /// Sniffing errors as in [`Self::sniff`] and [`Self::sniff_as`], or the
    /// loader's error if the full load fails.
    pub fn load(&self, data: &[u8], options: &LoadOptions) -> Result<Loaded> {
        let sniff_ctx = options.sniff_context();
        let Sniffed { loader, descriptor } = match options.format {
            Some(kind) => self.sniff_as(kind, data, &sniff_ctx)?,
            None => self.sniff(data, &sniff_ctx)?,
        };

        let ctx = BaseRelative::new(descriptor.base_address);
        let image = loader.load(data, &ctx)?;
        info!(
            format = %descriptor.kind,
            arch = %descriptor.arch,
            base = format!("{:#x}", descriptor.base_address),
            segments = image.segments.len(),
            entries = image.entry_points.len(),
            "loaded image"
        );
        Ok(Loaded { descriptor, image })
    }
}
