//! Well-known event signatures loaded into every registry built with
//! [`crate::SignatureRegistry::seeded`].
//!
//! ERC-721 `Transfer`/`Approval` hash to the same topics as their ERC-20
//! counterparts; the ERC-20 layout is seeded and an ERC-721 ABI supplied
//! with a request replaces it in that request's snapshot.

pub const SEED_SIGNATURES: &[&str] = &[
    // ERC-20
    "event Transfer(address indexed from, address indexed to, uint256 value)",
    "event Approval(address indexed owner, address indexed spender, uint256 value)",
    // ERC-721 / ERC-1155
    "event ApprovalForAll(address indexed owner, address indexed operator, bool approved)",
    // ERC-1155
    "event TransferSingle(address indexed operator, address indexed from, address indexed to, uint256 id, uint256 value)",
    "event TransferBatch(address indexed operator, address indexed from, address indexed to, uint256[] ids, uint256[] values)",
    "event URI(string value, uint256 indexed id)",
    // WETH
    "event Deposit(address indexed dst, uint256 wad)",
    "event Withdrawal(address indexed src, uint256 wad)",
    // Ownable
    "event OwnershipTransferred(address indexed previousOwner, address indexed newOwner)",
    // Uniswap V2 pair
    "event Swap(address indexed sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address indexed to)",
    "event Sync(uint112 reserve0, uint112 reserve1)",
    "event Mint(address indexed sender, uint256 amount0, uint256 amount1)",
    "event Burn(address indexed sender, uint256 amount0, uint256 amount1, address indexed to)",
    // Uniswap V3 pool
    "event Swap(address indexed sender, address indexed recipient, int256 amount0, int256 amount1, uint160 sqrtPriceX96, uint128 liquidity, int24 tick)",
];
