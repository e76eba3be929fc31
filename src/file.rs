//! Fixed file header, fixed stats record, and the sequential
//! reader/writer that frames the variable-length block stream between
//! them.

use std::fs::File as FsFile;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::block::{Block, BlockHeader};
use crate::codec::CodecId;
use crate::config::{
    BLOCK_HEADER_SIZE, FILE_HEADER_SIZE, IDENT_LEN, MAGIC, STATS_RECORD_SIZE, SUPPORTED_VERSIONS,
    WRITE_VERSION,
};
use crate::dispatch::for_each_block;
use crate::error::{NfdumpError, Result};

/// Non-compression flag bits, kept alongside the codec's own
/// [`CodecId::flag_bit`] values in the same 32-bit space.
pub const FLAG_ANONYMIZED: u32 = 0x2;
pub const FLAG_CATALOG: u32 = 0x4;

/// Fixed 144-byte on-disk file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u16,
    pub version: u16,
    pub flags: u32,
    pub num_blocks: u32,
    pub ident: [u8; IDENT_LEN],
}

impl FileHeader {
    pub fn new(ident: &str) -> FileHeader {
        let mut buf = [0u8; IDENT_LEN];
        let bytes = ident.as_bytes();
        let n = bytes.len().min(IDENT_LEN);
        buf[..n].copy_from_slice(&bytes[..n]);
        FileHeader {
            magic: MAGIC,
            version: WRITE_VERSION,
            flags: 0,
            num_blocks: 0,
            ident: buf,
        }
    }

    fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut out = [0u8; FILE_HEADER_SIZE];
        out[0..2].copy_from_slice(&self.magic.to_le_bytes());
        out[2..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..8].copy_from_slice(&self.flags.to_le_bytes());
        out[8..12].copy_from_slice(&self.num_blocks.to_le_bytes());
        out[12..12 + IDENT_LEN].copy_from_slice(&self.ident);
        out
    }

    fn from_bytes(buf: &[u8; FILE_HEADER_SIZE]) -> FileHeader {
        let mut ident = [0u8; IDENT_LEN];
        ident.copy_from_slice(&buf[12..12 + IDENT_LEN]);
        FileHeader {
            magic: u16::from_le_bytes([buf[0], buf[1]]),
            version: u16::from_le_bytes([buf[2], buf[3]]),
            flags: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            num_blocks: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            ident,
        }
    }

    pub fn ident_str(&self) -> String {
        let end = self.ident.iter().position(|&b| b == 0).unwrap_or(IDENT_LEN);
        String::from_utf8_lossy(&self.ident[..end]).into_owned()
    }
}

/// Fixed 136-byte on-disk stats record. Treated as an opaque blob by
/// every operation except construction; field layout follows
/// `stat_record_s` in the reference `types.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsRecord {
    pub numflows: u64,
    pub numbytes: u64,
    pub numpackets: u64,
    pub numflows_tcp: u64,
    pub numflows_udp: u64,
    pub numflows_icmp: u64,
    pub numflows_other: u64,
    pub numbytes_tcp: u64,
    pub numbytes_udp: u64,
    pub numbytes_icmp: u64,
    pub numbytes_other: u64,
    pub numpackets_tcp: u64,
    pub numpackets_udp: u64,
    pub numpackets_icmp: u64,
    pub numpackets_other: u64,
    pub first_seen: u32,
    pub last_seen: u32,
    pub msec_first: u16,
    pub msec_last: u16,
    pub sequence_failure: u32,
}

impl StatsRecord {
    fn to_bytes(&self) -> [u8; STATS_RECORD_SIZE] {
        let mut out = [0u8; STATS_RECORD_SIZE];
        let mut pos = 0;
        macro_rules! put_u64 {
            ($field:expr) => {{
                out[pos..pos + 8].copy_from_slice(&$field.to_le_bytes());
                pos += 8;
            }};
        }
        macro_rules! put_u32 {
            ($field:expr) => {{
                out[pos..pos + 4].copy_from_slice(&$field.to_le_bytes());
                pos += 4;
            }};
        }
        macro_rules! put_u16 {
            ($field:expr) => {{
                out[pos..pos + 2].copy_from_slice(&$field.to_le_bytes());
                pos += 2;
            }};
        }
        put_u64!(self.numflows);
        put_u64!(self.numbytes);
        put_u64!(self.numpackets);
        put_u64!(self.numflows_tcp);
        put_u64!(self.numflows_udp);
        put_u64!(self.numflows_icmp);
        put_u64!(self.numflows_other);
        put_u64!(self.numbytes_tcp);
        put_u64!(self.numbytes_udp);
        put_u64!(self.numbytes_icmp);
        put_u64!(self.numbytes_other);
        put_u64!(self.numpackets_tcp);
        put_u64!(self.numpackets_udp);
        put_u64!(self.numpackets_icmp);
        put_u64!(self.numpackets_other);
        put_u32!(self.first_seen);
        put_u32!(self.last_seen);
        put_u16!(self.msec_first);
        put_u16!(self.msec_last);
        put_u32!(self.sequence_failure);
        // Remaining bytes (pad to the struct's declared 136-byte size) stay zero.
        out
    }

    fn from_bytes(buf: &[u8; STATS_RECORD_SIZE]) -> StatsRecord {
        let mut pos = 0;
        macro_rules! get_u64 {
            () => {{
                let v = u64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap());
                pos += 8;
                v
            }};
        }
        macro_rules! get_u32 {
            () => {{
                let v = u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap());
                pos += 4;
                v
            }};
        }
        macro_rules! get_u16 {
            () => {{
                let v = u16::from_le_bytes(buf[pos..pos + 2].try_into().unwrap());
                pos += 2;
                v
            }};
        }
        StatsRecord {
            numflows: get_u64!(),
            numbytes: get_u64!(),
            numpackets: get_u64!(),
            numflows_tcp: get_u64!(),
            numflows_udp: get_u64!(),
            numflows_icmp: get_u64!(),
            numflows_other: get_u64!(),
            numbytes_tcp: get_u64!(),
            numbytes_udp: get_u64!(),
            numbytes_icmp: get_u64!(),
            numbytes_other: get_u64!(),
            numpackets_tcp: get_u64!(),
            numpackets_udp: get_u64!(),
            numpackets_icmp: get_u64!(),
            numpackets_other: get_u64!(),
            first_seen: get_u32!(),
            last_seen: get_u32!(),
            msec_first: get_u16!(),
            msec_last: get_u16!(),
            sequence_failure: get_u32!(),
        }
    }
}

impl BlockHeader {
    fn to_bytes(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut out = [0u8; BLOCK_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.num_records.to_le_bytes());
        out[4..8].copy_from_slice(&self.size.to_le_bytes());
        out[8..10].copy_from_slice(&self.id.to_le_bytes());
        out[10..12].copy_from_slice(&self.flags.to_le_bytes());
        out
    }

    fn from_bytes(buf: &[u8; BLOCK_HEADER_SIZE]) -> BlockHeader {
        BlockHeader {
            num_records: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            size: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            id: u16::from_le_bytes([buf[8], buf[9]]),
            flags: u16::from_le_bytes([buf[10], buf[11]]),
        }
    }
}

/// An in-memory nfdump file: header, stats, and an ordered sequence of
/// blocks, plus the bookkeeping needed to save back to disk.
#[derive(Debug)]
pub struct File {
    pub header: FileHeader,
    pub stats: StatsRecord,
    pub blocks: Vec<Block>,
    /// Total bytes read from disk, recorded after a successful load.
    pub size: u64,
    pub name: PathBuf,
}

impl File {
    pub fn new_empty(name: impl Into<PathBuf>) -> File {
        File {
            header: FileHeader::new(""),
            stats: StatsRecord::default(),
            blocks: Vec::new(),
            size: 0,
            name: name.into(),
        }
    }

    /// The minimum (most negative) status across all blocks; 0 if the
    /// file has no blocks or every block is ok.
    pub fn blocks_status(&self) -> i32 {
        self.blocks.iter().map(|b| b.status).min().unwrap_or(0)
    }

    /// Sequentially parses header, stats, and blocks from `path`.
    ///
    /// If `handler` is given, it is dispatched on each block as soon as
    /// it is read, interleaved with reading the next one (produce-then-
    /// spawn); the caller is not required to call [`for_each_block`]
    /// afterward. If `handler` is `None`, reading is a single
    /// sequential pass and the caller decides separately whether to
    /// run `for_each_block`.
    pub fn load<H>(path: impl AsRef<Path>, handler: Option<H>) -> Result<File>
    where
        H: Fn(usize, &mut Block) + Sync,
    {
        let path = path.as_ref();
        info!("Reading {}", path.display());

        let mut f = FsFile::open(path).map_err(|source| NfdumpError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut header_buf = [0u8; FILE_HEADER_SIZE];
        read_exact_or_fatal(&mut f, &mut header_buf, path, "file header")?;
        let header = FileHeader::from_bytes(&header_buf);
        debug!("Read file header");

        if header.magic != MAGIC {
            return Err(NfdumpError::BadMagic {
                path: path.to_path_buf(),
                expected: MAGIC,
                found: header.magic,
            });
        }
        if !SUPPORTED_VERSIONS.contains(&header.version) {
            return Err(NfdumpError::UnsupportedVersion {
                path: path.to_path_buf(),
                version: header.version,
            });
        }

        let mut stats_buf = [0u8; STATS_RECORD_SIZE];
        read_exact_or_fatal(&mut f, &mut stats_buf, path, "file stats")?;
        let stats = StatsRecord::from_bytes(&stats_buf);
        debug!("Read file stats");

        let file_compression = CodecId::from_flags(header.flags);
        info!(
            "File compression: {}  flags: {}",
            file_compression.name(),
            header.flags
        );

        let mut file = File {
            header,
            stats,
            blocks: Vec::new(),
            size: 0,
            name: path.to_path_buf(),
        };

        let declared = file.header.num_blocks;
        let mut pending: Vec<Option<Block>> = Vec::with_capacity(declared as usize);
        // Blocks with a handler dispatched are moved out of `pending`
        // and sent back over this channel once the handler finishes,
        // so the reader never holds a reference into a growing `Vec`
        // across a concurrent mutation of that same block.
        let (tx, rx) = std::sync::mpsc::channel::<(usize, Block)>();

        let read_result = rayon::scope(|scope| -> Result<()> {
            loop {
                let mut block_header_buf = [0u8; BLOCK_HEADER_SIZE];
                match read_block_header(&mut f, &mut block_header_buf) {
                    BlockHeaderRead::Eof => break,
                    BlockHeaderRead::Short => {
                        error!("Failed to read block header");
                        return Err(NfdumpError::ShortRead {
                            path: path.to_path_buf(),
                            what: "block header",
                            expected: BLOCK_HEADER_SIZE,
                            actual: 0,
                        });
                    }
                    BlockHeaderRead::Ok => {}
                }
                let block_header = BlockHeader::from_bytes(&block_header_buf);

                let mut payload = vec![0u8; block_header.size as usize];
                read_exact_or_fatal(&mut f, &mut payload, path, "block data")?;

                let mut block = Block::new_empty();
                block.header = block_header;
                block.status = 0;
                block.compression = if block.block_type().is_catalog() {
                    CodecId::None
                } else {
                    file_compression
                };
                block.file_compression = block.compression;
                let size = block.header.size as usize;
                block.compressed_size = size;
                block.uncompressed_size = size;
                block.payload = payload;

                let index = pending.len();
                pending.push(None);

                match handler.as_ref() {
                    Some(h) => {
                        let tx = tx.clone();
                        scope.spawn(move |_| {
                            let mut block = block;
                            debug!("Dispatching block {index}");
                            h(index, &mut block);
                            let _ = tx.send((index, block));
                        });
                    }
                    None => pending[index] = Some(block),
                }
            }
            Ok(())
        });
        drop(tx);
        for (index, block) in rx.try_iter() {
            pending[index] = Some(block);
        }
        read_result?;

        let found = pending.len() as u32;
        if found > declared {
            info!("Fixed block count in header. found {found}, header {declared}");
        }
        file.header.num_blocks = declared.max(found);
        file.blocks = pending
            .into_iter()
            .map(|b| b.expect("every pending slot is filled before blocks_status is checked"))
            .collect();

        if (file.blocks.len() as u32) < declared {
            error!(
                "Missing blocks in file. found {}, expected {}",
                file.blocks.len(),
                declared
            );
            return Err(NfdumpError::MissingBlocks {
                path: path.to_path_buf(),
                declared,
                found: file.blocks.len() as u32,
            });
        }

        if file.blocks_status() < 0 {
            error!("One or more blocks failed to load properly");
            return Err(NfdumpError::BlockFaulted {
                index: file
                    .blocks
                    .iter()
                    .position(|b| b.status < 0)
                    .unwrap_or(0),
                status: file.blocks_status(),
            });
        }

        file.size = f
            .metadata()
            .map(|m| m.len())
            .unwrap_or(0);
        Ok(file)
    }

    /// Serializes header, stats, and every block to `path`, truncating
    /// any existing contents. The file-level compression flag is
    /// derived from the first block; every block must have status 0.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Writing {}", path.display());

        if self.blocks.is_empty() {
            error!("Not saving empty file");
            return Err(NfdumpError::EmptyFile);
        }

        let file_compression = self.blocks[0].compression;
        self.header.flags &= !CodecId::all_flag_bits();
        self.header.flags |= file_compression.flag_bit();
        info!(
            "File compression: {}  flags:{}",
            file_compression.name(),
            self.header.flags
        );
        self.header.num_blocks = self.blocks.len() as u32;

        let mut f = FsFile::create(path).map_err(|source| NfdumpError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        write_all_or_fatal(&mut f, &self.header.to_bytes(), path, "file header")?;
        debug!("Written file header");
        write_all_or_fatal(&mut f, &self.stats.to_bytes(), path, "file stats")?;
        debug!("Written file stats");

        for (index, block) in self.blocks.iter().enumerate() {
            if block.status != 0 {
                error!("Invalid block");
                return Err(NfdumpError::BlockFaulted {
                    index,
                    status: block.status,
                });
            }
            write_all_or_fatal(&mut f, &block.header.to_bytes(), path, "block header")?;
            write_all_or_fatal(&mut f, &block.payload, path, "block data")?;
        }

        self.name = path.to_path_buf();
        Ok(())
    }

    /// Saves back to the path the file was last loaded from or saved
    /// to. Equivalent to `save_as(file, file.name)`.
    pub fn save(&mut self) -> Result<()> {
        let path = self.name.clone();
        self.save_as(path)
    }

    /// Runs `handler` over every block, see [`for_each_block`].
    pub fn for_each_block<H>(&mut self, handler: H) -> i32
    where
        H: Fn(usize, &mut Block) + Sync,
    {
        for_each_block(&mut self.blocks, handler)
    }
}

enum BlockHeaderRead {
    Ok,
    Eof,
    Short,
}

fn read_block_header(f: &mut FsFile, buf: &mut [u8; BLOCK_HEADER_SIZE]) -> BlockHeaderRead {
    let mut total = 0;
    loop {
        match f.read(&mut buf[total..]) {
            Ok(0) => {
                return if total == 0 {
                    BlockHeaderRead::Eof
                } else {
                    BlockHeaderRead::Short
                }
            }
            Ok(n) => {
                total += n;
                if total == buf.len() {
                    return BlockHeaderRead::Ok;
                }
            }
            Err(_) => return BlockHeaderRead::Short,
        }
    }
}

fn read_exact_or_fatal(
    f: &mut FsFile,
    buf: &mut [u8],
    path: &Path,
    what: &'static str,
) -> Result<()> {
    let expected = buf.len();
    let mut total = 0;
    while total < expected {
        match f.read(&mut buf[total..]) {
            Ok(0) => {
                error!("Failed to read {what}");
                return Err(NfdumpError::ShortRead {
                    path: path.to_path_buf(),
                    what,
                    expected,
                    actual: total,
                });
            }
            Ok(n) => total += n,
            Err(source) => {
                return Err(NfdumpError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
    Ok(())
}

fn write_all_or_fatal(
    f: &mut FsFile,
    buf: &[u8],
    path: &Path,
    what: &'static str,
) -> Result<()> {
    f.write_all(buf).map_err(|_source| {
        error!("Failed to write {what}");
        NfdumpError::ShortWrite {
            path: path.to_path_buf(),
            what,
            expected: buf.len(),
            actual: 0,
        }
    })
}
